//! Error types for image processors.

use dstretch_core::ErrorKind;
use thiserror::Error;

/// Error type for image processors.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Input buffer was rejected.
    #[error(transparent)]
    Core(#[from] dstretch_core::Error),
}

impl OpsError {
    /// Creates an [`OpsError::InvalidParameter`] error.
    #[inline]
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Returns the failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDimensions(_) => ErrorKind::InvalidImage,
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::Core(e) => e.kind(),
        }
    }
}

/// Result type for image processors.
pub type OpsResult<T> = Result<T, OpsError>;

/// Fails with [`OpsError::InvalidParameter`] unless `lo <= value <= hi`.
pub(crate) fn check_range(name: &str, value: f64, lo: f64, hi: f64) -> OpsResult<()> {
    if !(lo..=hi).contains(&value) {
        return Err(OpsError::InvalidParameter(format!(
            "{} must be in [{}, {}], got {}",
            name, lo, hi, value
        )));
    }
    Ok(())
}
