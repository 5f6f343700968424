//! YAML pipeline configuration.
//!
//! ```yaml
//! colorspace: LXX
//! scale: 20
//! custom_matrix:
//!   - [1.0, 0.0, 0.0]
//!   - [0.0, 1.4, -0.2]
//!   - [0.0, -0.2, 1.4]
//! steps:
//!   - type: color_balance
//!     method: white_patch
//!   - type: auto_contrast
//!     clip_percentage: 0.5
//! ```
//!
//! Every field is optional. A `preset` supplies whatever the file leaves out.

use crate::decorrelation::{check_scale, DecorrelationStretch, DEFAULT_COLORSPACE, DEFAULT_SCALE};
use crate::pipeline::{CompositeResult, Pipeline, PreprocessingConfig};
use crate::presets::Preset;
use crate::{DstretchError, DstretchResult};
use dstretch_color::ColorspaceDescriptor;
use dstretch_core::RgbImage;
use dstretch_math::Mat3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Name the custom matrix is registered under for YUV-family use.
pub const CUSTOM_YUV_NAME: &str = "YXX";
/// Name the custom matrix is registered under for LAB-family use.
pub const CUSTOM_LAB_NAME: &str = "LXX";

/// Pipeline settings loaded from YAML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Base recipe for unset fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,
    /// Preprocessing steps
    pub steps: Option<PreprocessingConfig>,
    /// Colorspace name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorspace: Option<String>,
    /// Stretch scale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Row-major matrix for the YXX and LXX spaces
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_matrix: Option<[[f64; 3]; 3]>,
}

impl PipelineConfig {
    /// Loads a config file.
    ///
    /// # Errors
    ///
    /// `ConfigNotFound` if the path does not exist, `Io` or `Yaml` if it
    /// cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> DstretchResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DstretchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading pipeline config");
        Self::from_yaml_str(&content)
    }

    /// Parses a YAML document.
    pub fn from_yaml_str(yaml: &str) -> DstretchResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serializes to YAML.
    pub fn to_yaml_string(&self) -> DstretchResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Config equivalent to a preset.
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            preset: Some(preset),
            ..Default::default()
        }
    }

    /// Effective preprocessing steps.
    pub fn steps(&self) -> PreprocessingConfig {
        match (&self.steps, self.preset) {
            (Some(steps), _) => steps.clone(),
            (None, Some(preset)) => preset.config(),
            (None, None) => PreprocessingConfig::none(),
        }
    }

    /// Effective colorspace name.
    pub fn colorspace(&self) -> &str {
        match (&self.colorspace, self.preset) {
            (Some(name), _) => name.as_str(),
            (None, Some(preset)) => preset.colorspace(),
            (None, None) => DEFAULT_COLORSPACE,
        }
    }

    /// Effective scale.
    pub fn scale(&self) -> f64 {
        self.scale
            .or_else(|| self.preset.map(|p| p.scale()))
            .unwrap_or(DEFAULT_SCALE)
    }

    /// Engine with the custom matrix registered, if any.
    ///
    /// # Errors
    ///
    /// `Numeric` if the custom matrix is singular.
    pub fn engine(&self) -> DstretchResult<DecorrelationStretch> {
        let mut engine = DecorrelationStretch::new();
        if let Some(rows) = self.custom_matrix {
            let matrix = Mat3::from_rows(rows);
            engine.register(ColorspaceDescriptor::user_yuv(CUSTOM_YUV_NAME, Some(matrix))?);
            engine.register(ColorspaceDescriptor::user_lab(CUSTOM_LAB_NAME, Some(matrix))?);
        }
        Ok(engine)
    }

    /// Checks steps, colorspace and scale without touching an image.
    pub fn validate(&self) -> DstretchResult<()> {
        self.steps().ordered()?;
        self.engine()?.registry().get(self.colorspace())?;
        check_scale(self.scale())
    }

    /// Runs the configured pipeline.
    pub fn run(&self, image: &RgbImage) -> DstretchResult<CompositeResult> {
        let pipeline = Pipeline::with_engine(self.engine()?);
        pipeline.process_complete(image, &self.steps(), self.colorspace(), self.scale())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dstretch_core::ErrorKind;
    use dstretch_ops::ProcessorKind;
    use tempfile::tempdir;

    #[test]
    fn test_empty_document_uses_defaults() {
        let cfg = PipelineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg.colorspace(), "YDS");
        assert_eq!(cfg.scale(), 15.0);
        assert!(cfg.steps().is_empty());
    }

    #[test]
    fn test_preset_fills_gaps() {
        let cfg = PipelineConfig::from_yaml_str("preset: yellows\nscale: 30\n").unwrap();
        assert_eq!(cfg.colorspace(), "LDS");
        assert_eq!(cfg.scale(), 30.0);
        assert_eq!(cfg.steps().names().unwrap(), vec!["auto_contrast"]);
    }

    #[test]
    fn test_steps_parse_in_any_order() {
        let yaml = "steps:\n  - type: invert\n  - type: flatten\n    method: rolling_ball\n";
        let cfg = PipelineConfig::from_yaml_str(yaml).unwrap();
        let steps = cfg.steps();
        let ordered = steps.ordered().unwrap();
        assert_eq!(ordered[0].kind(), ProcessorKind::Flatten);
        assert_eq!(ordered[1].kind(), ProcessorKind::Invert);
    }

    #[test]
    fn test_custom_matrix_registers_user_spaces() {
        let yaml = "colorspace: YXX\ncustom_matrix: [[0.299, 0.587, 0.114], [-0.1, -0.2, 0.3], [0.6, -0.5, -0.1]]\n";
        let cfg = PipelineConfig::from_yaml_str(yaml).unwrap();
        let engine = cfg.engine().unwrap();
        assert!(engine.registry().contains("YXX"));
        assert!(engine.registry().contains("LXX"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_singular_custom_matrix() {
        let cfg = PipelineConfig {
            custom_matrix: Some([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]]),
            ..Default::default()
        };
        assert_eq!(cfg.engine().unwrap_err().kind(), ErrorKind::Numeric);
    }

    #[test]
    fn test_bad_yaml_is_config_error() {
        let err = PipelineConfig::from_yaml_str("steps: [{type: sharpen}]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        let err = PipelineConfig::from_file("/nonexistent/dstretch.yaml").unwrap_err();
        assert!(matches!(err, DstretchError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_from_file_reads_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.yaml");
        std::fs::write(&path, "preset: faint_reds\ncolorspace: YRE\n").unwrap();
        let cfg = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(cfg.preset, Some(Preset::FaintReds));
        assert_eq!(cfg.colorspace(), "YRE");
        assert_eq!(cfg.scale(), Preset::FaintReds.scale());
    }

    #[test]
    fn test_from_file_rejects_bad_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "scale: [not, a, number]\n").unwrap();
        let err = PipelineConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_validate_reports_bad_scale() {
        let cfg = PipelineConfig::from_yaml_str("scale: 250").unwrap();
        assert_eq!(cfg.validate().unwrap_err().kind(), ErrorKind::ScaleOutOfRange);
    }
}
