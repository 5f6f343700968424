//! Error types for colorspace operations.

use dstretch_core::ErrorKind;
use thiserror::Error;

/// Colorspace operation error.
#[derive(Debug, Error)]
pub enum ColorError {
    /// No colorspace is registered under this name.
    #[error("unknown colorspace '{name}', available: {}", available.join(", "))]
    UnknownColorspace {
        /// Requested name
        name: String,
        /// Registered names, sorted
        available: Vec<String>,
    },

    /// A user-supplied matrix cannot be inverted.
    #[error("matrix for colorspace '{name}' is singular or not finite")]
    SingularMatrix {
        /// Colorspace the matrix was meant for
        name: String,
    },

    /// Buffer validation failed.
    #[error(transparent)]
    Core(#[from] dstretch_core::Error),
}

impl ColorError {
    /// Returns the failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownColorspace { .. } => ErrorKind::UnknownColorspace,
            Self::SingularMatrix { .. } => ErrorKind::Numeric,
            Self::Core(e) => e.kind(),
        }
    }
}

/// Result type for colorspace operations.
pub type ColorResult<T> = Result<T, ColorError>;
