//! # dstretch-ops
//!
//! Independent RGB to RGB processors used before (or instead of) the
//! decorrelation stretch.
//!
//! Every processor is a pure function `(image, params) -> (image, stats)`:
//! the input is never modified, options are validated before any pixel work,
//! and degenerate input (flat or black images) produces a well-defined,
//! usually unchanged, output instead of an error.
//!
//! # Modules
//!
//! - [`invert`] - full, luminance-only and per-channel inversion
//! - [`auto_contrast`] - percentile histogram stretch
//! - [`color_balance`] - gray-world, white-patch and manual cast correction
//! - [`flatten`] - illumination flattening (band-pass, Gaussian, rolling ball, paraboloid)
//! - [`hue_shift`] - HSV hue rotation and saturation boost
//! - [`processor`] - [`ProcessorKind`] / [`ProcessorParams`] dispatch
//! - [`filter`], [`fft`], [`morphology`] - plane-level building blocks
//!
//! # Example
//!
//! ```rust
//! use dstretch_core::RgbImage;
//! use dstretch_ops::color_balance::{color_balance, ColorBalanceParams};
//!
//! let img = RgbImage::from_fn(32, 32, |x, y| [150 + (x % 8) as u8, 100, 80 + (y % 4) as u8]);
//! let (balanced, stats) = color_balance(&img, &ColorBalanceParams::default()).unwrap();
//!
//! assert!(stats.cast_after < stats.cast_before);
//! assert_eq!(balanced.dimensions(), img.dimensions());
//! ```
//!
//! # Dependencies
//!
//! - `rustfft` - band-pass filtering
//! - `rayon` - row-parallel filters
//! - `serde` - parameter structs load from config files
//!
//! # Used By
//!
//! - `dstretch` - preprocessing pipeline

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod auto_contrast;
pub mod color_balance;
pub mod fft;
pub mod filter;
pub mod flatten;
pub mod hue_shift;
pub mod invert;
pub mod morphology;
pub mod processor;

pub use error::{OpsError, OpsResult};
pub use processor::{ProcessorKind, ProcessorParams, ProcessorStatistics, StepResult};
