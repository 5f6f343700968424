//! Error types for the decorrelation engine and pipeline.

use dstretch_color::ColorError;
use dstretch_core::ErrorKind;
use dstretch_ops::OpsError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for engine operations.
pub type DstretchResult<T> = Result<T, DstretchError>;

/// Errors raised by the engine, the pipeline and config loading.
#[derive(Debug, Error)]
pub enum DstretchError {
    /// Stretch intensity outside `1.0..=100.0`.
    #[error("scale must be between 1.0 and 100.0, got {0}")]
    ScaleOutOfRange(f64),

    /// Pipeline configuration is inconsistent.
    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),

    /// Colorspace lookup or construction failed.
    #[error(transparent)]
    Color(#[from] ColorError),

    /// A processor rejected its input or options.
    #[error(transparent)]
    Ops(#[from] OpsError),

    /// Buffer or mask validation failed.
    #[error(transparent)]
    Core(#[from] dstretch_core::Error),

    /// Config file not found.
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched.
        path: PathBuf,
    },

    /// I/O error reading a config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl DstretchError {
    /// Returns the failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ScaleOutOfRange(_) => ErrorKind::ScaleOutOfRange,
            Self::InvalidPipeline(_) => ErrorKind::InvalidParameter,
            Self::Color(e) => e.kind(),
            Self::Ops(e) => e.kind(),
            Self::Core(e) => e.kind(),
            Self::ConfigNotFound { .. } | Self::Io(_) | Self::Yaml(_) => ErrorKind::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(DstretchError::ScaleOutOfRange(0.5).kind(), ErrorKind::ScaleOutOfRange);
        let core = DstretchError::from(dstretch_core::Error::invalid_mask("empty"));
        assert_eq!(core.kind(), ErrorKind::InvalidMask);
        let ops = DstretchError::from(OpsError::invalid_parameter("strength"));
        assert_eq!(ops.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_scale_message() {
        let msg = DstretchError::ScaleOutOfRange(150.0).to_string();
        assert!(msg.contains("150"));
    }
}
