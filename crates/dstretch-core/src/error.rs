//! Error types for dstretch-core operations.
//!
//! Besides the crate-local [`Error`] enum this module defines [`ErrorKind`],
//! the closed taxonomy every error in the workspace maps onto. Callers that
//! only care about *what kind* of validation failed (a GUI picking a message,
//! a test asserting on the failure class) match on the kind instead of the
//! concrete error type of each crate.
//!
//! # Usage
//!
//! ```rust
//! use dstretch_core::{Error, ErrorKind, Result};
//!
//! fn check_scale(scale: f64) -> Result<()> {
//!     if scale <= 0.0 {
//!         return Err(Error::other("scale must be positive"));
//!     }
//!     Ok(())
//! }
//!
//! let err = Error::invalid_image("zero width");
//! assert_eq!(err.kind(), ErrorKind::InvalidImage);
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure classes shared by every crate in the workspace.
///
/// All of them are raised synchronously at validation time, before any pixel
/// work begins, so an operation either fully succeeds or leaves nothing behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Image buffer has the wrong shape (zero area, length mismatch).
    InvalidImage,
    /// Colorspace name is not registered.
    UnknownColorspace,
    /// Stretch intensity outside `1.0..=100.0`.
    ScaleOutOfRange,
    /// Selection mask does not match the image or selects nothing.
    InvalidMask,
    /// Processor-specific option out of range.
    InvalidParameter,
    /// Singular or non-finite user matrix.
    Numeric,
    /// Configuration could not be read or parsed.
    Config,
    /// Anything else.
    Other,
}

/// Errors produced by the core buffer types.
#[derive(Debug, Error)]
pub enum Error {
    /// The image buffer is malformed.
    ///
    /// Returned for zero-area images and for raw buffers whose length is not
    /// `width * height * 3`.
    #[error("invalid image: {reason}")]
    InvalidImage {
        /// Why the image was rejected
        reason: String,
    },

    /// The selection mask cannot be used with this image.
    #[error("invalid selection mask: {reason}")]
    InvalidMask {
        /// Why the mask was rejected
        reason: String,
    },

    /// Two buffers that must share dimensions do not.
    #[error("dimension mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        /// First buffer width
        a_width: u32,
        /// First buffer height
        a_height: u32,
        /// Second buffer width
        b_width: u32,
        /// Second buffer height
        b_height: u32,
    },

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates an [`Error::InvalidImage`] error.
    #[inline]
    pub fn invalid_image(reason: impl Into<String>) -> Self {
        Self::InvalidImage {
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidMask`] error.
    #[inline]
    pub fn invalid_mask(reason: impl Into<String>) -> Self {
        Self::InvalidMask {
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(a: (u32, u32), b: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }

    /// Creates an [`Error::Other`] error.
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Returns the failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidImage { .. } | Self::DimensionMismatch { .. } => ErrorKind::InvalidImage,
            Self::InvalidMask { .. } => ErrorKind::InvalidMask,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_image_kind() {
        let err = Error::invalid_image("zero width");
        assert_eq!(err.kind(), ErrorKind::InvalidImage);
        assert!(err.to_string().contains("zero width"));
    }

    #[test]
    fn test_invalid_mask_kind() {
        let err = Error::invalid_mask("selects no pixels");
        assert_eq!(err.kind(), ErrorKind::InvalidMask);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = Error::dimension_mismatch((100, 100), (200, 50));
        let msg = err.to_string();
        assert!(msg.contains("100x100"));
        assert!(msg.contains("200x50"));
    }
}
