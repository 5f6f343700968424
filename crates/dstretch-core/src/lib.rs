//! # dstretch-core
//!
//! Core types for decorrelation stretch image enhancement.
//!
//! This crate provides the foundational types used throughout the workspace:
//!
//! - [`RgbImage`] - Immutable-by-default 8-bit RGB buffer (channel order R, G, B)
//! - [`FloatImage`] - Double precision 3-channel raster used between stages
//! - [`SelectionMask`] - Boolean pixel selection for restricted statistics
//! - [`Error`], [`ErrorKind`] - Shared error taxonomy
//!
//! ## Buffer Semantics
//!
//! Every operator consumes one buffer and produces a new one. [`RgbImage`]
//! shares its pixels through an [`Arc`](std::sync::Arc), so handing the
//! original to a result record is free, and mutation is copy-on-write:
//!
//! ```rust
//! use dstretch_core::RgbImage;
//!
//! let original = RgbImage::filled(4, 4, [128, 128, 128]);
//! let mut edited = original.clone();
//! edited.set_pixel(0, 0, [255, 0, 0]);
//!
//! assert_eq!(original.pixel(0, 0), [128, 128, 128]);
//! assert_eq!(edited.pixel(0, 0), [255, 0, 0]);
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//! dstretch-core (this crate)
//!    ^
//!    |
//!    +-- dstretch-math (Mat3, statistics, eigen)
//!    +-- dstretch-color (colorspace registry)
//!    +-- dstretch-ops (independent processors)
//!    +-- dstretch (decorrelation engine, pipeline)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod image;
pub mod mask;
pub mod pixel;

pub use error::*;
pub use image::*;
pub use mask::*;
pub use pixel::{luma601, quantize, REC601_LUMA, REC601_LUMA_B, REC601_LUMA_G, REC601_LUMA_R};

/// Prelude module for convenient imports.
///
/// ```
/// use dstretch_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::image::{FloatImage, RgbImage};
    pub use crate::mask::SelectionMask;
    pub use crate::pixel::{luma601, quantize, REC601_LUMA};
}
