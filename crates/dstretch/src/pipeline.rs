//! Preprocessing pipeline.
//!
//! A [`PreprocessingConfig`] lists which processors to run and with which
//! options. The listing order does not matter: steps always run in the
//! canonical order
//!
//! ```text
//! flatten -> color_balance -> auto_contrast -> hue_shift -> invert
//! ```
//!
//! and each kind may appear at most once. The preprocessed image can then be
//! fed to the decorrelation stretch with [`Pipeline::process_complete`].

use crate::decorrelation::{check_scale, DecorrelationStretch, ProcessingResult};
use crate::{DstretchError, DstretchResult};
use dstretch_core::{RgbImage, SelectionMask};
use dstretch_ops::{ProcessorKind, ProcessorParams, StepResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Processors to run before the stretch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreprocessingConfig {
    steps: Vec<ProcessorParams>,
}

impl PreprocessingConfig {
    /// Config from a list of steps, in any order.
    pub fn new(steps: Vec<ProcessorParams>) -> Self {
        Self { steps }
    }

    /// Empty config.
    pub fn none() -> Self {
        Self::default()
    }

    /// Starts a builder.
    ///
    /// ```rust
    /// use dstretch::PreprocessingConfig;
    /// use dstretch_ops::auto_contrast::AutoContrastParams;
    /// use dstretch_ops::{ProcessorKind, ProcessorParams};
    ///
    /// let config = PreprocessingConfig::builder()
    ///     .enable(ProcessorKind::Invert)
    ///     .step(ProcessorParams::AutoContrast(AutoContrastParams {
    ///         clip_percentage: 0.2,
    ///         ..Default::default()
    ///     }))
    ///     .build();
    ///
    /// assert_eq!(config.len(), 2);
    /// assert_eq!(config.names().unwrap(), vec!["auto_contrast", "invert"]);
    /// ```
    pub fn builder() -> PreprocessingConfigBuilder {
        PreprocessingConfigBuilder::default()
    }

    /// Steps as given.
    pub fn steps(&self) -> &[ProcessorParams] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if no step is configured.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Validates every step and returns them in canonical order.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for a duplicated kind or an out-of-range option.
    pub fn ordered(&self) -> DstretchResult<Vec<&ProcessorParams>> {
        let mut ordered: Vec<&ProcessorParams> = self.steps.iter().collect();
        ordered.sort_by_key(|p| p.kind().order());
        for pair in ordered.windows(2) {
            if pair[0].kind() == pair[1].kind() {
                return Err(DstretchError::InvalidPipeline(format!(
                    "processor '{}' configured more than once",
                    pair[0].kind()
                )));
            }
        }
        for step in &ordered {
            step.validate()?;
        }
        Ok(ordered)
    }

    /// Step names in canonical order.
    pub fn names(&self) -> DstretchResult<Vec<&'static str>> {
        Ok(self.ordered()?.iter().map(|p| p.kind().name()).collect())
    }
}

/// Builder for [`PreprocessingConfig`].
#[derive(Debug, Clone, Default)]
pub struct PreprocessingConfigBuilder {
    steps: Vec<ProcessorParams>,
}

impl PreprocessingConfigBuilder {
    /// Adds a processor with default options.
    pub fn enable(mut self, kind: ProcessorKind) -> Self {
        self.steps.push(ProcessorParams::default_for(kind));
        self
    }

    /// Adds a processor with explicit options.
    pub fn step(mut self, params: ProcessorParams) -> Self {
        self.steps.push(params);
        self
    }

    /// Finishes the config.
    pub fn build(self) -> PreprocessingConfig {
        PreprocessingConfig { steps: self.steps }
    }
}

/// Output of preprocessing followed by the stretch.
#[derive(Debug, Clone)]
pub struct CompositeResult {
    /// Pipeline input
    pub original: RgbImage,
    /// Image after preprocessing (the input when nothing ran)
    pub preprocessed: RgbImage,
    /// Per-step results in application order
    pub steps: Vec<StepResult>,
    /// Stretch result
    pub decorrelation: ProcessingResult,
}

impl CompositeResult {
    /// Final enhanced image.
    #[inline]
    pub fn final_image(&self) -> &RgbImage {
        &self.decorrelation.image
    }

    /// Image fed into the stretch.
    #[inline]
    pub fn preprocessed_image(&self) -> &RgbImage {
        &self.preprocessed
    }

    /// Returns true if at least one processor ran.
    pub fn has_preprocessing(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Names of the steps that ran, in order.
    pub fn preprocessing_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.kind.name()).collect()
    }
}

/// Runs preprocessing and the stretch.
///
/// ```rust
/// use dstretch::{Pipeline, PreprocessingConfig};
/// use dstretch_core::RgbImage;
/// use dstretch_ops::ProcessorKind;
///
/// let img = RgbImage::from_fn(32, 32, |x, y| [100 + x as u8, 80 + y as u8, 60]);
/// let config = PreprocessingConfig::builder()
///     .enable(ProcessorKind::AutoContrast)
///     .enable(ProcessorKind::ColorBalance)
///     .build();
///
/// let result = Pipeline::new().process_complete(&img, &config, "CRGB", 15.0).unwrap();
/// assert!(result.has_preprocessing());
/// assert_eq!(result.preprocessing_names(), vec!["color_balance", "auto_contrast"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    engine: DecorrelationStretch,
}

impl Pipeline {
    /// Pipeline over the built-in colorspaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline over a configured engine.
    pub fn with_engine(engine: DecorrelationStretch) -> Self {
        Self { engine }
    }

    /// Underlying engine.
    pub fn engine(&self) -> &DecorrelationStretch {
        &self.engine
    }

    /// Runs only the preprocessing steps.
    ///
    /// # Errors
    ///
    /// Fails before touching pixels on an invalid image or config.
    pub fn process(
        &self,
        image: &RgbImage,
        config: &PreprocessingConfig,
    ) -> DstretchResult<(RgbImage, Vec<StepResult>)> {
        image.ensure_valid()?;
        let ordered = config.ordered()?;
        Ok(run_steps(image, &ordered)?)
    }

    /// Runs only the stretch.
    pub fn process_decorrelation_only(
        &self,
        image: &RgbImage,
        colorspace: &str,
        scale: f64,
        mask: Option<&SelectionMask>,
    ) -> DstretchResult<ProcessingResult> {
        self.engine.process(image, colorspace, scale, mask)
    }

    /// Runs preprocessing and then the stretch.
    ///
    /// Image, steps, colorspace and scale are all validated before the
    /// first processor runs.
    pub fn process_complete(
        &self,
        image: &RgbImage,
        config: &PreprocessingConfig,
        colorspace: &str,
        scale: f64,
    ) -> DstretchResult<CompositeResult> {
        image.ensure_valid()?;
        let ordered = config.ordered()?;
        self.engine.registry().get(colorspace)?;
        check_scale(scale)?;
        debug!(steps = ordered.len(), colorspace, scale, "pipeline");

        let (preprocessed, steps) = run_steps(image, &ordered)?;
        let decorrelation = self.engine.process(&preprocessed, colorspace, scale, None)?;
        Ok(CompositeResult {
            original: image.clone(),
            preprocessed,
            steps,
            decorrelation,
        })
    }
}

fn run_steps(
    image: &RgbImage,
    ordered: &[&ProcessorParams],
) -> dstretch_ops::OpsResult<(RgbImage, Vec<StepResult>)> {
    let mut current = image.clone();
    let mut results = Vec::with_capacity(ordered.len());
    for params in ordered {
        let step = params.apply(&current)?;
        current = step.image.clone();
        results.push(step);
    }
    Ok((current, results))
}
