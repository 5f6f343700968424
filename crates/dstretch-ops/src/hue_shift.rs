//! Hue rotation in HSV.
//!
//! The requested shift is reduced into `(-180, 180]` before use, so `360`
//! is a no-op and `-180` and `180` are the same rotation. Saturation can be
//! boosted at the same time (clamped to 1). In selective mode only pixels
//! within `hue_tolerance` degrees of `target_hue` and with saturation of at
//! least `min_saturation` are touched; everything else passes through
//! bit-exact.

use crate::error::check_range;
use crate::OpsResult;
use dstretch_color::hsv::{hsv_to_rgb, hue_distance, rgb_to_hsv};
use dstretch_core::{quantize, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hue shift options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HueShiftParams {
    /// Rotation in degrees, `-360..=360`
    pub hue_shift: f64,
    /// Saturation multiplier, `0..=3`
    pub saturation_boost: f64,
    /// Restrict to a hue band
    pub selective: bool,
    /// Band center in degrees, `0..=360`
    pub target_hue: f64,
    /// Band half-width in degrees, `0..=180`
    pub hue_tolerance: f64,
    /// Minimum saturation of affected pixels, `0..=1`
    pub min_saturation: f64,
}

impl Default for HueShiftParams {
    fn default() -> Self {
        Self {
            hue_shift: 0.0,
            saturation_boost: 1.0,
            selective: false,
            target_hue: 0.0,
            hue_tolerance: 30.0,
            min_saturation: 0.1,
        }
    }
}

impl HueShiftParams {
    /// Plain rotation by `degrees`.
    pub fn rotate(degrees: f64) -> Self {
        Self {
            hue_shift: degrees,
            ..Default::default()
        }
    }

    /// Checks ranges.
    pub fn validate(&self) -> OpsResult<()> {
        check_range("hue_shift", self.hue_shift, -360.0, 360.0)?;
        check_range("saturation_boost", self.saturation_boost, 0.0, 3.0)?;
        check_range("target_hue", self.target_hue, 0.0, 360.0)?;
        check_range("hue_tolerance", self.hue_tolerance, 0.0, 180.0)?;
        check_range("min_saturation", self.min_saturation, 0.0, 1.0)
    }

    fn affects(&self, hsv: [f64; 3]) -> bool {
        !self.selective
            || (hsv[1] >= self.min_saturation
                && hue_distance(hsv[0], self.target_hue) <= self.hue_tolerance)
    }
}

/// Reduces an angle into `(-180, 180]`.
///
/// ```rust
/// use dstretch_ops::hue_shift::wrap_shift;
///
/// assert_eq!(wrap_shift(180.0), 180.0);
/// assert_eq!(wrap_shift(-180.0), 180.0);
/// assert_eq!(wrap_shift(270.0), -90.0);
/// assert_eq!(wrap_shift(360.0), 0.0);
/// ```
pub fn wrap_shift(degrees: f64) -> f64 {
    let w = degrees.rem_euclid(360.0);
    if w > 180.0 { w - 360.0 } else { w }
}

/// Hue shift diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HueShiftStats {
    /// Shift as requested
    pub requested_shift: f64,
    /// Shift after wrapping
    pub applied_shift: f64,
    /// Saturation multiplier used
    pub saturation_boost: f64,
    /// Pixels inside the selection (all pixels when not selective)
    pub pixels_affected: usize,
}

/// Rotates hue and scales saturation.
///
/// # Errors
///
/// Fails on an invalid image or an out-of-range option.
pub fn hue_shift(image: &RgbImage, params: &HueShiftParams) -> OpsResult<(RgbImage, HueShiftStats)> {
    image.ensure_valid()?;
    params.validate()?;
    let applied = wrap_shift(params.hue_shift);
    debug!(
        requested = params.hue_shift,
        applied,
        saturation_boost = params.saturation_boost,
        selective = params.selective,
        "hue_shift"
    );

    let to_hsv = |p: [u8; 3]| rgb_to_hsv(p.map(|c| c as f64 / 255.0));
    let pixels_affected = image.pixels().filter(|p| params.affects(to_hsv(*p))).count();

    let out = if applied == 0.0 && params.saturation_boost == 1.0 {
        image.clone()
    } else {
        let p = *params;
        image.map_pixels(move |px| {
            let hsv = to_hsv(px);
            if !p.affects(hsv) {
                return px;
            }
            let s = (hsv[1] * p.saturation_boost).min(1.0);
            hsv_to_rgb([hsv[0] + applied, s, hsv[2]]).map(|c| quantize(c * 255.0))
        })
    };

    Ok((
        out,
        HueShiftStats {
            requested_shift: params.hue_shift,
            applied_shift: applied,
            saturation_boost: params.saturation_boost,
            pixels_affected,
        },
    ))
}
