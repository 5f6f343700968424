//! Uniform entry point over the processors.
//!
//! [`ProcessorParams`] carries the options of one processor and is
//! internally tagged, so a step reads naturally in YAML:
//!
//! ```yaml
//! type: color_balance
//! method: gray_world
//! strength: 0.8
//! ```
//!
//! Omitted fields fall back to the processor defaults.

use crate::auto_contrast::{auto_contrast, AutoContrastParams, AutoContrastStats};
use crate::color_balance::{color_balance, ColorBalanceParams, ColorBalanceStats};
use crate::flatten::{flatten, FlattenParams, FlattenStats};
use crate::hue_shift::{hue_shift, HueShiftParams, HueShiftStats};
use crate::invert::{invert, InvertParams, InvertStats};
use crate::OpsResult;
use dstretch_core::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Processor identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorKind {
    /// Illumination flattening
    Flatten,
    /// Color cast correction
    ColorBalance,
    /// Percentile contrast stretch
    AutoContrast,
    /// Hue rotation
    HueShift,
    /// Inversion
    Invert,
}

impl ProcessorKind {
    /// Every processor, in canonical pipeline order.
    pub const ALL: [ProcessorKind; 5] = [
        Self::Flatten,
        Self::ColorBalance,
        Self::AutoContrast,
        Self::HueShift,
        Self::Invert,
    ];

    /// Snake-case name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Flatten => "flatten",
            Self::ColorBalance => "color_balance",
            Self::AutoContrast => "auto_contrast",
            Self::HueShift => "hue_shift",
            Self::Invert => "invert",
        }
    }

    /// One-line description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Flatten => "Remove uneven illumination while keeping fine detail",
            Self::ColorBalance => "Correct a global color cast",
            Self::AutoContrast => "Percentile-based histogram stretch",
            Self::HueShift => "Rotate hue and boost saturation",
            Self::Invert => "Invert colors, luminance or selected channels",
        }
    }

    /// Position in the canonical pipeline order.
    pub fn order(&self) -> usize {
        *self as usize
    }

    /// Looks a kind up by its snake-case name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for ProcessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options of one processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessorParams {
    /// See [`crate::flatten`]
    Flatten(FlattenParams),
    /// See [`crate::color_balance`]
    ColorBalance(ColorBalanceParams),
    /// See [`crate::auto_contrast`]
    AutoContrast(AutoContrastParams),
    /// See [`crate::hue_shift`]
    HueShift(HueShiftParams),
    /// See [`crate::invert`]
    Invert(InvertParams),
}

impl ProcessorParams {
    /// Default options for `kind`.
    pub fn default_for(kind: ProcessorKind) -> Self {
        match kind {
            ProcessorKind::Flatten => Self::Flatten(FlattenParams::default()),
            ProcessorKind::ColorBalance => Self::ColorBalance(ColorBalanceParams::default()),
            ProcessorKind::AutoContrast => Self::AutoContrast(AutoContrastParams::default()),
            ProcessorKind::HueShift => Self::HueShift(HueShiftParams::default()),
            ProcessorKind::Invert => Self::Invert(InvertParams::default()),
        }
    }

    /// Which processor these options belong to.
    pub fn kind(&self) -> ProcessorKind {
        match self {
            Self::Flatten(_) => ProcessorKind::Flatten,
            Self::ColorBalance(_) => ProcessorKind::ColorBalance,
            Self::AutoContrast(_) => ProcessorKind::AutoContrast,
            Self::HueShift(_) => ProcessorKind::HueShift,
            Self::Invert(_) => ProcessorKind::Invert,
        }
    }

    /// Checks option ranges without touching pixels.
    pub fn validate(&self) -> OpsResult<()> {
        match self {
            Self::Flatten(p) => p.validate(),
            Self::ColorBalance(p) => p.validate(),
            Self::AutoContrast(p) => p.validate(),
            Self::HueShift(p) => p.validate(),
            Self::Invert(p) => p.validate(),
        }
    }

    /// Runs the processor.
    ///
    /// ```rust
    /// use dstretch_core::RgbImage;
    /// use dstretch_ops::processor::{ProcessorKind, ProcessorParams};
    ///
    /// let img = RgbImage::filled(4, 4, [10, 20, 30]);
    /// let step = ProcessorParams::default_for(ProcessorKind::Invert).apply(&img).unwrap();
    /// assert_eq!(step.image.pixel(0, 0), [245, 235, 225]);
    /// assert_eq!(step.kind, ProcessorKind::Invert);
    /// ```
    pub fn apply(&self, image: &RgbImage) -> OpsResult<StepResult> {
        let (image, statistics) = match self {
            Self::Flatten(p) => {
                let (img, s) = flatten(image, p)?;
                (img, ProcessorStatistics::Flatten(s))
            }
            Self::ColorBalance(p) => {
                let (img, s) = color_balance(image, p)?;
                (img, ProcessorStatistics::ColorBalance(s))
            }
            Self::AutoContrast(p) => {
                let (img, s) = auto_contrast(image, p)?;
                (img, ProcessorStatistics::AutoContrast(s))
            }
            Self::HueShift(p) => {
                let (img, s) = hue_shift(image, p)?;
                (img, ProcessorStatistics::HueShift(s))
            }
            Self::Invert(p) => {
                let (img, s) = invert(image, p)?;
                (img, ProcessorStatistics::Invert(s))
            }
        };
        Ok(StepResult {
            kind: self.kind(),
            image,
            statistics,
        })
    }
}

/// Diagnostics of one processor run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessorStatistics {
    /// Flatten diagnostics
    Flatten(FlattenStats),
    /// Color balance diagnostics
    ColorBalance(ColorBalanceStats),
    /// Auto-contrast diagnostics
    AutoContrast(AutoContrastStats),
    /// Hue shift diagnostics
    HueShift(HueShiftStats),
    /// Invert diagnostics
    Invert(InvertStats),
}

/// Output of one processor run.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Processor that ran
    pub kind: ProcessorKind,
    /// Processed image
    pub image: RgbImage,
    /// Its diagnostics
    pub statistics: ProcessorStatistics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_balance::BalanceMethod;

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in ProcessorKind::ALL {
            assert_eq!(ProcessorKind::from_name(kind.name()), Some(kind));
            assert_eq!(ProcessorParams::default_for(kind).kind(), kind);
        }
        assert_eq!(ProcessorKind::from_name("sharpen"), None);
        assert!(ProcessorKind::Flatten.order() < ProcessorKind::Invert.order());
    }

    #[test]
    fn test_yaml_partial_params() {
        let yaml = "type: color_balance\nmethod: white_patch\n";
        let params: ProcessorParams = serde_yaml::from_str(yaml).unwrap();
        match params {
            ProcessorParams::ColorBalance(p) => {
                assert_eq!(p.method, BalanceMethod::WhitePatch);
                assert_eq!(p.strength, 0.8);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_yaml_unknown_type_fails() {
        assert!(serde_yaml::from_str::<ProcessorParams>("type: sharpen\n").is_err());
    }

    #[test]
    fn test_apply_reports_statistics() {
        let img = RgbImage::from_fn(16, 16, |x, y| [(x * 8) as u8, (y * 8) as u8, 90]);
        for kind in ProcessorKind::ALL {
            let step = ProcessorParams::default_for(kind).apply(&img).unwrap();
            assert_eq!(step.image.dimensions(), img.dimensions());
            let matches = matches!(
                (kind, &step.statistics),
                (ProcessorKind::Flatten, ProcessorStatistics::Flatten(_))
                    | (ProcessorKind::ColorBalance, ProcessorStatistics::ColorBalance(_))
                    | (ProcessorKind::AutoContrast, ProcessorStatistics::AutoContrast(_))
                    | (ProcessorKind::HueShift, ProcessorStatistics::HueShift(_))
                    | (ProcessorKind::Invert, ProcessorStatistics::Invert(_))
            );
            assert!(matches, "{}", kind);
        }
    }
}
