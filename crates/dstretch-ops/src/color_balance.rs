//! Global color cast correction.
//!
//! A per-channel gain is derived from a reference (channel means for
//! gray-world, bright percentiles for white-patch, or caller factors).
//!
//! ```text
//! corrected = clamp(v * gain, 0, 255)
//! blended   = v + strength * (corrected - v)
//! out       = quantize(blended * k)     k = luma(mean v) / luma(mean blended)
//! ```
//!
//! `k` is 1 unless `preserve_luminance` is set. Blending happens after the
//! clamp, so clipped highlights still move only part of the way to white.

use crate::auto_contrast::{histogram, percentiles};
use crate::error::check_range;
use crate::{OpsError, OpsResult};
use dstretch_core::{quantize, RgbImage, REC601_LUMA};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Cast strength under which an image counts as neutral.
pub const NEUTRAL_THRESHOLD: f64 = 0.05;
/// Cast strength above which correction is recommended.
pub const CORRECTION_THRESHOLD: f64 = 0.1;

/// Reference used to derive channel gains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceMethod {
    /// Scene average should be neutral gray.
    #[default]
    GrayWorld,
    /// Brightest patch should be white.
    WhitePatch,
    /// Caller-supplied gains.
    Manual,
}

/// Color balance options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorBalanceParams {
    /// How gains are derived
    pub method: BalanceMethod,
    /// Blend toward the corrected image, `0..=1`
    pub strength: f64,
    /// Keep mean luma unchanged
    pub preserve_luminance: bool,
    /// Percent of bright samples ignored by `WhitePatch`, `0..=5`
    pub white_patch_clip: f64,
    /// Gains for `Manual`; must be positive
    pub manual_factors: [f64; 3],
}

impl Default for ColorBalanceParams {
    fn default() -> Self {
        Self {
            method: BalanceMethod::GrayWorld,
            strength: 0.8,
            preserve_luminance: true,
            white_patch_clip: 0.1,
            manual_factors: [1.0; 3],
        }
    }
}

impl ColorBalanceParams {
    /// Manual gains at full strength.
    pub fn manual(factors: [f64; 3]) -> Self {
        Self {
            method: BalanceMethod::Manual,
            strength: 1.0,
            preserve_luminance: false,
            manual_factors: factors,
            ..Default::default()
        }
    }

    /// Checks ranges.
    pub fn validate(&self) -> OpsResult<()> {
        check_range("strength", self.strength, 0.0, 1.0)?;
        check_range("white_patch_clip", self.white_patch_clip, 0.0, 5.0)?;
        if self.method == BalanceMethod::Manual
            && self.manual_factors.iter().any(|f| !(f.is_finite() && *f > 0.0))
        {
            return Err(OpsError::invalid_parameter(format!(
                "manual factors must be positive, got {:?}",
                self.manual_factors
            )));
        }
        Ok(())
    }
}

/// Strongest channel of a cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DominantCast {
    /// No significant cast
    Neutral,
    /// Red channel dominates
    Red,
    /// Green channel dominates
    Green,
    /// Blue channel dominates
    Blue,
}

impl fmt::Display for DominantCast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Neutral => "neutral",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        };
        f.write_str(s)
    }
}

/// `(max - min) / mean` of the channel means; 0 for a black image.
pub fn cast_strength(means: [f64; 3]) -> f64 {
    let avg = means.iter().sum::<f64>() / 3.0;
    if avg <= 0.0 {
        return 0.0;
    }
    let max = means.iter().cloned().fold(f64::MIN, f64::max);
    let min = means.iter().cloned().fold(f64::MAX, f64::min);
    (max - min) / avg
}

fn dominant_cast(means: [f64; 3]) -> DominantCast {
    if cast_strength(means) < NEUTRAL_THRESHOLD {
        return DominantCast::Neutral;
    }
    // first maximum wins ties
    let mut best = 0;
    for c in 1..3 {
        if means[c] > means[best] {
            best = c;
        }
    }
    [DominantCast::Red, DominantCast::Green, DominantCast::Blue][best]
}

/// Cast summary of an image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorCastAnalysis {
    /// Channel means on the 0..255 scale
    pub channel_means: [f64; 3],
    /// See [`cast_strength`]
    pub cast_strength: f64,
    /// Strongest channel
    pub dominant_cast: DominantCast,
    /// Cast strength above [`CORRECTION_THRESHOLD`]
    pub needs_correction: bool,
}

/// Measures the color cast of an image.
///
/// ```rust
/// use dstretch_core::RgbImage;
/// use dstretch_ops::color_balance::{analyze_cast, DominantCast};
///
/// let img = RgbImage::filled(4, 4, [180, 120, 100]);
/// let a = analyze_cast(&img).unwrap();
/// assert_eq!(a.dominant_cast, DominantCast::Red);
/// assert!(a.needs_correction);
/// ```
pub fn analyze_cast(image: &RgbImage) -> OpsResult<ColorCastAnalysis> {
    image.ensure_valid()?;
    let channel_means = image.channel_means();
    let strength = cast_strength(channel_means);
    Ok(ColorCastAnalysis {
        channel_means,
        cast_strength: strength,
        dominant_cast: dominant_cast(channel_means),
        needs_correction: strength > CORRECTION_THRESHOLD,
    })
}

/// Color balance diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBalanceStats {
    /// Method used
    pub method: BalanceMethod,
    /// Channel means before correction
    pub original_means: [f64; 3],
    /// Neutral target level (mean of the channel means)
    pub gray_level: f64,
    /// Raw per-channel gains before strength and luminance handling
    pub correction_factors: [f64; 3],
    /// Brightness renormalization applied after blending (1 when off)
    pub luminance_scale: f64,
    /// Cast strength before
    pub cast_before: f64,
    /// Cast strength after
    pub cast_after: f64,
    /// Dominant cast before correction
    pub dominant_cast: DominantCast,
}

/// Corrects a global color cast.
///
/// # Errors
///
/// Fails on an invalid image or out-of-range options. Channels with a zero
/// reference keep a gain of 1.
pub fn color_balance(
    image: &RgbImage,
    params: &ColorBalanceParams,
) -> OpsResult<(RgbImage, ColorBalanceStats)> {
    image.ensure_valid()?;
    params.validate()?;
    debug!(
        method = ?params.method,
        strength = params.strength,
        preserve_luminance = params.preserve_luminance,
        "color_balance"
    );

    let means = image.channel_means();
    let gray_level = means.iter().sum::<f64>() / 3.0;
    let correction_factors = match params.method {
        BalanceMethod::GrayWorld => means.map(|m| if m > 0.0 { gray_level / m } else { 1.0 }),
        BalanceMethod::WhitePatch => [0usize, 1, 2].map(|c| {
            let (_, white) = percentiles(&histogram(image, Some(c)), params.white_patch_clip);
            if white > 0 { 255.0 / white as f64 } else { 1.0 }
        }),
        BalanceMethod::Manual => params.manual_factors,
    };

    trace!(?correction_factors, "gains");

    let strength = params.strength;
    let blended = image.to_float(|p| {
        let mut out = [0.0; 3];
        for c in 0..3 {
            let v = p[c] as f64;
            let corrected = (v * correction_factors[c]).clamp(0.0, 255.0);
            out[c] = v + strength * (corrected - v);
        }
        out
    });

    let mut luminance_scale = 1.0;
    if params.preserve_luminance {
        let luma = |m: [f64; 3]| (0..3).map(|c| REC601_LUMA[c] * m[c]).sum::<f64>();
        let after = luma(float_means(blended.pixels()));
        if after > 0.0 {
            luminance_scale = luma(means) / after;
        }
    }
    trace!(luminance_scale, "renormalize");

    let out = blended.to_rgb(|p| p.map(|v| quantize(v * luminance_scale)));

    let stats = ColorBalanceStats {
        method: params.method,
        original_means: means,
        gray_level,
        correction_factors,
        luminance_scale,
        cast_before: cast_strength(means),
        cast_after: cast_strength(out.channel_means()),
        dominant_cast: dominant_cast(means),
    };
    Ok((out, stats))
}

fn float_means(pixels: &[[f64; 3]]) -> [f64; 3] {
    let mut sum = [0.0; 3];
    for p in pixels {
        for c in 0..3 {
            sum[c] += p[c];
        }
    }
    let n = pixels.len().max(1) as f64;
    sum.map(|s| s / n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use dstretch_core::ErrorKind;

    fn textured(base: [u8; 3]) -> RgbImage {
        RgbImage::from_fn(20, 20, |x, y| {
            let d = ((x + y) % 7) as u8 * 5;
            [base[0] + d, base[1] + d, base[2] + d]
        })
    }

    #[test]
    fn test_gray_world_neutral_is_noop() {
        let img = textured([80, 80, 80]);
        let (out, stats) = color_balance(&img, &ColorBalanceParams::default()).unwrap();
        assert_eq!(out, img);
        assert_eq!(stats.dominant_cast, DominantCast::Neutral);
        assert_abs_diff_eq!(stats.cast_before, 0.0);
    }

    #[test]
    fn test_gray_world_full_strength_removes_cast() {
        let img = textured([150, 100, 80]);
        let params = ColorBalanceParams {
            strength: 1.0,
            preserve_luminance: false,
            ..Default::default()
        };
        let (out, stats) = color_balance(&img, &params).unwrap();
        assert!(stats.cast_before > 0.5);
        assert!(stats.cast_after < 0.02);
        assert_eq!(stats.dominant_cast, DominantCast::Red);
        assert_abs_diff_eq!(stats.gray_level, out.channel_means()[0], epsilon = 1.0);
    }

    #[test]
    fn test_zero_strength_is_noop() {
        let img = textured([150, 100, 80]);
        let params = ColorBalanceParams {
            strength: 0.0,
            ..Default::default()
        };
        let (out, _) = color_balance(&img, &params).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_half_strength_blends_clipped_pixels() {
        let img = RgbImage::filled(2, 1, [200, 100, 100]);
        let params = ColorBalanceParams {
            strength: 0.5,
            ..ColorBalanceParams::manual([2.0, 1.0, 1.0])
        };
        let (out, stats) = color_balance(&img, &params).unwrap();
        // corrected red clips to 255, halfway back is 227.5
        assert_eq!(out.pixel(0, 0), [228, 100, 100]);
        assert_eq!(stats.luminance_scale, 1.0);
    }

    #[test]
    fn test_half_strength_matches_image_blend() {
        let img = RgbImage::from_fn(16, 16, |x, y| {
            let b = if (x + y) % 8 == 0 { 200 } else { 10 };
            [(120 + x * 8) as u8, (40 + y * 3) as u8, b]
        });
        let params = ColorBalanceParams {
            strength: 0.5,
            preserve_luminance: false,
            ..Default::default()
        };
        let (out, stats) = color_balance(&img, &params).unwrap();
        let f = stats.correction_factors;
        for y in 0..16 {
            for x in 0..16 {
                let p = img.pixel(x, y);
                let expected: [u8; 3] = [0usize, 1, 2].map(|c| {
                    let v = p[c] as f64;
                    let corrected = quantize(v * f[c]) as f64;
                    quantize(v + 0.5 * (corrected - v))
                });
                let got = out.pixel(x, y);
                for c in 0..3 {
                    assert!(got[c].abs_diff(expected[c]) <= 1, "{x},{y}: {got:?} vs {expected:?}");
                }
            }
        }
        // blue gain pushes the sparse bright pixels past 255
        assert!(f[2] > 2.0);
    }

    #[test]
    fn test_preserve_luminance() {
        let img = textured([160, 90, 60]);
        let (out, _) = color_balance(&img, &ColorBalanceParams::default()).unwrap();
        let luma = |m: [f64; 3]| (0..3).map(|c| REC601_LUMA[c] * m[c]).sum::<f64>();
        assert_abs_diff_eq!(luma(out.channel_means()), luma(img.channel_means()), epsilon = 0.6);
    }

    #[test]
    fn test_white_patch() {
        let img = RgbImage::from_fn(10, 10, |x, _| if x == 0 { [200, 250, 100] } else { [50, 50, 50] });
        let params = ColorBalanceParams {
            method: BalanceMethod::WhitePatch,
            strength: 1.0,
            preserve_luminance: false,
            white_patch_clip: 0.0,
            ..Default::default()
        };
        let (out, stats) = color_balance(&img, &params).unwrap();
        assert_abs_diff_eq!(stats.correction_factors[2], 2.55);
        assert_eq!(out.pixel(0, 0), [255, 255, 255]);
    }

    #[test]
    fn test_manual_validation() {
        let img = textured([10, 20, 30]);
        let err = color_balance(&img, &ColorBalanceParams::manual([1.0, 0.0, 1.0])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        let (out, _) = color_balance(&img, &ColorBalanceParams::manual([2.0, 1.0, 0.5])).unwrap();
        assert_eq!(out.pixel(0, 0), [20, 20, 15]);
    }

    #[test]
    fn test_black_image_degrades_gracefully() {
        let img = RgbImage::filled(5, 5, [0, 0, 0]);
        let (out, stats) = color_balance(&img, &ColorBalanceParams::default()).unwrap();
        assert_eq!(out, img);
        assert_eq!(stats.correction_factors, [1.0; 3]);
    }
}
