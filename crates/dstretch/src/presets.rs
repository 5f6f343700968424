//! Named enhancement recipes.

use crate::pipeline::{CompositeResult, Pipeline, PreprocessingConfig};
use crate::DstretchResult;
use dstretch_core::RgbImage;
use dstretch_ops::auto_contrast::AutoContrastParams;
use dstretch_ops::color_balance::ColorBalanceParams;
use dstretch_ops::{ProcessorKind, ProcessorParams};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Preprocessing, colorspace and scale bundled under one name.
///
/// | Preset          | Steps                           | Space | Scale |
/// |-----------------|---------------------------------|-------|-------|
/// | `standard`      | auto_contrast                   | YDS   | 15    |
/// | `faint_reds`    | color_balance, auto_contrast    | CRGB  | 15    |
/// | `yellows`       | auto_contrast                   | LDS   | 20    |
/// | `high_contrast` | flatten, auto_contrast          | LRE   | 25    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// General purpose
    Standard,
    /// Faded red pigment
    FaintReds,
    /// Yellow and ochre pigment
    Yellows,
    /// Uneven lighting, strong separation
    HighContrast,
}

impl Preset {
    /// Every preset.
    pub const ALL: [Preset; 4] = [
        Self::Standard,
        Self::FaintReds,
        Self::Yellows,
        Self::HighContrast,
    ];

    /// Snake-case name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::FaintReds => "faint_reds",
            Self::Yellows => "yellows",
            Self::HighContrast => "high_contrast",
        }
    }

    /// Looks a preset up by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// One-line description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Standard => "Contrast stretch followed by YDS",
            Self::FaintReds => "Neutralized cast and CRGB for faded reds",
            Self::Yellows => "Contrast stretch followed by LDS",
            Self::HighContrast => "Flattened lighting and a strong LRE stretch",
        }
    }

    /// Preprocessing steps.
    pub fn config(&self) -> PreprocessingConfig {
        match self {
            Self::Standard => PreprocessingConfig::builder()
                .enable(ProcessorKind::AutoContrast)
                .build(),
            Self::FaintReds => PreprocessingConfig::builder()
                .step(ProcessorParams::ColorBalance(ColorBalanceParams {
                    strength: 0.6,
                    ..Default::default()
                }))
                .enable(ProcessorKind::AutoContrast)
                .build(),
            Self::Yellows => PreprocessingConfig::builder()
                .step(ProcessorParams::AutoContrast(AutoContrastParams {
                    clip_percentage: 0.5,
                    ..Default::default()
                }))
                .build(),
            Self::HighContrast => PreprocessingConfig::builder()
                .enable(ProcessorKind::Flatten)
                .enable(ProcessorKind::AutoContrast)
                .build(),
        }
    }

    /// Colorspace name.
    pub fn colorspace(&self) -> &'static str {
        match self {
            Self::Standard => "YDS",
            Self::FaintReds => "CRGB",
            Self::Yellows => "LDS",
            Self::HighContrast => "LRE",
        }
    }

    /// Stretch scale.
    pub fn scale(&self) -> f64 {
        match self {
            Self::Standard | Self::FaintReds => 15.0,
            Self::Yellows => 20.0,
            Self::HighContrast => 25.0,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs a preset over the built-in colorspaces.
///
/// ```rust
/// use dstretch::{quick_enhance, Preset};
/// use dstretch_core::RgbImage;
///
/// let img = RgbImage::from_fn(24, 24, |x, y| [140 + x as u8, 110 + y as u8, 90]);
/// let result = quick_enhance(&img, Preset::Standard).unwrap();
/// assert_eq!(result.preprocessing_names(), vec!["auto_contrast"]);
/// assert_eq!(result.decorrelation.colorspace, "YDS");
/// ```
pub fn quick_enhance(image: &RgbImage, preset: Preset) -> DstretchResult<CompositeResult> {
    Pipeline::new().process_complete(image, &preset.config(), preset.colorspace(), preset.scale())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for preset in Preset::ALL {
            assert_eq!(Preset::from_name(preset.name()), Some(preset));
        }
        assert_eq!(Preset::from_name("vivid"), None);
    }

    #[test]
    fn test_presets_are_valid() {
        let registry = dstretch_color::ColorspaceRegistry::with_builtins();
        for preset in Preset::ALL {
            assert!(preset.config().ordered().is_ok(), "{preset}");
            assert!(registry.contains(preset.colorspace()), "{preset}");
            assert!(crate::decorrelation::check_scale(preset.scale()).is_ok());
        }
    }

    #[test]
    fn test_every_preset_runs() {
        let img = RgbImage::from_fn(32, 32, |x, y| {
            [(90 + x * 3) as u8, (70 + y * 2) as u8, (60 + (x + y) % 16) as u8]
        });
        for preset in Preset::ALL {
            let r = quick_enhance(&img, preset).unwrap();
            assert_eq!(r.final_image().dimensions(), (32, 32));
            assert!(r.has_preprocessing());
        }
    }

    #[test]
    fn test_faint_reds_order() {
        assert_eq!(
            Preset::FaintReds.config().names().unwrap(),
            vec!["color_balance", "auto_contrast"]
        );
    }
}
