//! Caller-owned editing session.

use crate::decorrelation::{DecorrelationStretch, ProcessingResult};
use crate::pipeline::{CompositeResult, Pipeline, PreprocessingConfig};
use crate::DstretchResult;
use dstretch_core::{RgbImage, SelectionMask};

/// Remembers the last original/processed pair across calls.
///
/// The engine itself keeps no state; a front end that wants a "reset to
/// original" button owns one of these per open image. Not meant to be
/// shared between threads without external locking.
///
/// ```rust
/// use dstretch::{DecorrelationStretch, Session};
/// use dstretch_core::RgbImage;
///
/// let engine = DecorrelationStretch::new();
/// let mut session = Session::new();
/// let img = RgbImage::from_fn(8, 8, |x, y| [x as u8 * 20, y as u8 * 20, 100]);
///
/// session.decorrelate(&engine, &img, "YDS", 15.0, None).unwrap();
/// assert!(session.last_processed().is_some());
///
/// let restored = session.reset().unwrap();
/// assert_eq!(restored, img);
/// assert!(session.last_processed().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Session {
    original: Option<RgbImage>,
    processed: Option<RgbImage>,
}

impl Session {
    /// Empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a finished run.
    pub fn record(&mut self, original: &RgbImage, processed: &RgbImage) {
        self.original = Some(original.clone());
        self.processed = Some(processed.clone());
    }

    /// Runs [`DecorrelationStretch::process`] and records the result.
    ///
    /// Nothing is recorded when the call fails.
    pub fn decorrelate(
        &mut self,
        engine: &DecorrelationStretch,
        image: &RgbImage,
        colorspace: &str,
        scale: f64,
        mask: Option<&SelectionMask>,
    ) -> DstretchResult<ProcessingResult> {
        let result = engine.process(image, colorspace, scale, mask)?;
        self.record(&result.original, &result.image);
        Ok(result)
    }

    /// Runs [`Pipeline::process_complete`] and records the result.
    pub fn run_pipeline(
        &mut self,
        pipeline: &Pipeline,
        image: &RgbImage,
        config: &PreprocessingConfig,
        colorspace: &str,
        scale: f64,
    ) -> DstretchResult<CompositeResult> {
        let result = pipeline.process_complete(image, config, colorspace, scale)?;
        self.record(image, result.final_image());
        Ok(result)
    }

    /// Last input image.
    pub fn last_original(&self) -> Option<&RgbImage> {
        self.original.as_ref()
    }

    /// Last output image.
    pub fn last_processed(&self) -> Option<&RgbImage> {
        self.processed.as_ref()
    }

    /// Drops the processed image and returns the original.
    pub fn reset(&mut self) -> Option<RgbImage> {
        self.processed = None;
        self.original.clone()
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.original = None;
        self.processed = None;
    }
}
