//! # dstretch-math
//!
//! Numeric kernel of the decorrelation stretch.
//!
//! - [`Mat3`] / [`Vec3`] - double precision 3x3 algebra
//! - [`ColorStatistics`] - mean and sample covariance of a 3-channel raster
//! - [`SymmetricEigen`] - ordered eigenbasis of a covariance matrix
//!
//! # Design
//!
//! Everything here is `f64`. Matrices are **row-major** and act on
//! **column vectors**:
//!
//! ```text
//! result = matrix * vector
//! ```
//!
//! # Usage
//!
//! ```rust
//! use dstretch_core::FloatImage;
//! use dstretch_math::{ColorStatistics, SymmetricEigen};
//!
//! let img = FloatImage::from_pixels(2, 1, vec![[0.0, 0.0, 0.0], [2.0, 2.0, 2.0]]).unwrap();
//! let stats = ColorStatistics::compute(&img, None).unwrap();
//! assert_eq!(stats.mean.to_array(), [1.0, 1.0, 1.0]);
//!
//! let eigen = SymmetricEigen::new(&stats.covariance);
//! assert!(eigen.values[0] >= eigen.values[1]);
//! ```
//!
//! # Dependencies
//!
//! - `dstretch-core` - buffers, masks and the shared error type
//! - [`rayon`] - chunked parallel reductions
//!
//! # Used By
//!
//! - `dstretch-color` - colorspace matrices
//! - `dstretch` - decorrelation engine

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod eigen;
mod mat3;
mod stats;
mod vec3;

pub use eigen::*;
pub use mat3::*;
pub use stats::*;
pub use vec3::*;
