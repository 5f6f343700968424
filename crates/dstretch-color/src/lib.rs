//! # dstretch-color
//!
//! Reversible colorspace transforms for decorrelation stretch.
//!
//! - [`ColorspaceRegistry`] - name to descriptor catalog (19 built-ins)
//! - [`ColorspaceDescriptor`] - metadata plus forward/inverse conversion
//! - [`ColorspaceKind`] - closed set of conversion families
//! - [`lab`], [`hsv`] - per-pixel conversion helpers
//!
//! # Families
//!
//! ```text
//! RGB, LAB         base spaces computed directly from 8-bit RGB
//! Y** (YDS ...)    3x3 matrix over normalized RGB, Rec.601 luma row
//! L** (LDS ...)    3x3 matrix over normalized LAB
//! CRGB             constant stretch matrix, bypasses eigen analysis
//! YXX, LXX         user-supplied matrix
//! ```
//!
//! All arithmetic is `f64`; quantization to 8-bit happens only in
//! [`ColorspaceDescriptor::from_space`], rounding to nearest and clamping
//! to `[0, 255]`.
//!
//! # Usage
//!
//! ```rust
//! use dstretch_color::ColorspaceRegistry;
//! use dstretch_core::RgbImage;
//!
//! let registry = ColorspaceRegistry::with_builtins();
//! let lds = registry.get("LDS").unwrap();
//!
//! let img = RgbImage::from_fn(16, 16, |x, y| [x as u8 * 16, y as u8 * 16, 128]);
//! let back = lds.from_space(&lds.to_space(&img));
//! assert_eq!(back.dimensions(), img.dimensions());
//! ```
//!
//! # Dependencies
//!
//! - `dstretch-core` - image buffers and quantization
//! - `dstretch-math` - [`Mat3`](dstretch_math::Mat3)
//!
//! # Used By
//!
//! - `dstretch-ops` - HSV for hue rotation
//! - `dstretch` - decorrelation engine

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod builtin;
pub mod error;
pub mod hsv;
pub mod lab;
pub mod registry;
pub mod space;

pub use builtin::builtin_colorspaces;
pub use error::{ColorError, ColorResult};
pub use registry::ColorspaceRegistry;
pub use space::{
    BaseSpace, ColorspaceDescriptor, ColorspaceKind, DecorrelationRoute, LAB_SCALE_ADJUST,
    RGB_SCALE_ADJUST, YUV_SCALE_ADJUST,
};
