//! # dstretch
//!
//! Decorrelation stretch for revealing faint pigment in photographs of
//! rock art and similar surfaces, plus the preprocessing pipeline that
//! prepares images for it.
//!
//! # Architecture
//!
//! ```text
//! RgbImage --> Pipeline -----------------------------> CompositeResult
//!                 |  flatten -> color_balance ->          ^
//!                 |  auto_contrast -> hue_shift -> invert |
//!                 v                                       |
//!           DecorrelationStretch --(ColorspaceRegistry)---+
//! ```
//!
//! # Modules
//!
//! - [`decorrelation`] - the stretch engine and [`ProcessingResult`]
//! - [`pipeline`] - ordered preprocessing and [`CompositeResult`]
//! - [`presets`] - named recipes and [`quick_enhance`]
//! - [`config`] - YAML [`PipelineConfig`]
//! - [`session`] - caller-owned last original/processed pair
//!
//! # Example
//!
//! ```rust
//! use dstretch::{decorrelate, list_colorspaces, run_pipeline};
//! use dstretch_core::RgbImage;
//! use dstretch_ops::{ProcessorKind, ProcessorParams};
//!
//! assert!(list_colorspaces().contains_key("YDS"));
//!
//! let img = RgbImage::from_fn(32, 32, |x, y| [120 + x as u8, 100 + y as u8, 90]);
//! let result = decorrelate(&img, "LRE", 20.0, None).unwrap();
//! assert_eq!(result.image.dimensions(), (32, 32));
//!
//! let steps = vec![ProcessorParams::default_for(ProcessorKind::AutoContrast)];
//! let composite = run_pipeline(&img, &steps, None, None).unwrap();
//! assert_eq!(composite.decorrelation.colorspace, "YDS");
//! ```
//!
//! # Dependencies
//!
//! - `dstretch-core`, `dstretch-math`, `dstretch-color`, `dstretch-ops`
//! - `rayon` - per-pixel stretch
//! - `serde_yaml` - pipeline config files
//! - `tracing` - diagnostics
//!
//! # Used By
//!
//! - front ends (CLI, GUI, batch scripts)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod config;
pub mod decorrelation;
pub mod pipeline;
pub mod presets;
pub mod session;

use std::collections::BTreeMap;

use dstretch_core::{RgbImage, SelectionMask};
use dstretch_ops::{ProcessorParams, StepResult};

pub use config::PipelineConfig;
pub use decorrelation::{
    DecorrelationStretch, ProcessingResult, DEFAULT_COLORSPACE, DEFAULT_SCALE, MAX_SCALE,
    MIN_SCALE,
};
pub use error::{DstretchError, DstretchResult};
pub use pipeline::{CompositeResult, Pipeline, PreprocessingConfig, PreprocessingConfigBuilder};
pub use presets::{quick_enhance, Preset};
pub use session::Session;

/// Built-in colorspace names mapped to their descriptions.
pub fn list_colorspaces() -> BTreeMap<String, String> {
    dstretch_color::ColorspaceRegistry::with_builtins().list()
}

/// Runs the stretch with the built-in colorspaces.
///
/// See [`DecorrelationStretch::process`].
pub fn decorrelate(
    image: &RgbImage,
    colorspace: &str,
    scale: f64,
    mask: Option<&SelectionMask>,
) -> DstretchResult<ProcessingResult> {
    DecorrelationStretch::new().process(image, colorspace, scale, mask)
}

/// Runs a single processor.
pub fn apply_processor(params: &ProcessorParams, image: &RgbImage) -> DstretchResult<StepResult> {
    image.ensure_valid()?;
    Ok(params.apply(image)?)
}

/// Preprocesses and stretches. Colorspace defaults to YDS, scale to 15.
pub fn run_pipeline(
    image: &RgbImage,
    steps: &[ProcessorParams],
    colorspace: Option<&str>,
    scale: Option<f64>,
) -> DstretchResult<CompositeResult> {
    let config = PreprocessingConfig::new(steps.to_vec());
    Pipeline::new().process_complete(
        image,
        &config,
        colorspace.unwrap_or(DEFAULT_COLORSPACE),
        scale.unwrap_or(DEFAULT_SCALE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dstretch_core::ErrorKind;
    use dstretch_ops::invert::InvertParams;

    #[test]
    fn test_list_has_every_family() {
        let spaces = list_colorspaces();
        assert_eq!(spaces.len(), 19);
        for name in ["RGB", "LAB", "CRGB", "YXX", "LXX"] {
            assert!(spaces.contains_key(name), "{name}");
        }
    }

    #[test]
    fn test_apply_processor_rejects_empty_image() {
        let err = apply_processor(
            &ProcessorParams::Invert(InvertParams::default()),
            &RgbImage::new(0, 0),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidImage);
    }

    #[test]
    fn test_run_pipeline_defaults() {
        let img = RgbImage::from_fn(8, 8, |x, y| [x as u8 * 30, y as u8 * 30, 77]);
        let r = run_pipeline(&img, &[], None, None).unwrap();
        assert_eq!(r.decorrelation.scale, 15.0);
        assert!(!r.has_preprocessing());
    }
}
