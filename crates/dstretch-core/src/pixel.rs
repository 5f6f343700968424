//! Pixel-level helpers: luma weights and 8-bit quantization.
//!
//! Luma follows ITU-R BT.601, which is the weighting every YUV-derived
//! colorspace in this workspace shares on its first row.

/// Rec.601 luma coefficient for red.
pub const REC601_LUMA_R: f64 = 0.299;
/// Rec.601 luma coefficient for green.
pub const REC601_LUMA_G: f64 = 0.587;
/// Rec.601 luma coefficient for blue.
pub const REC601_LUMA_B: f64 = 0.114;

/// Rec.601 luma coefficients as an array `[R, G, B]`.
pub const REC601_LUMA: [f64; 3] = [REC601_LUMA_R, REC601_LUMA_G, REC601_LUMA_B];

/// Computes Rec.601 luma of an RGB triplet (any scale).
///
/// ```rust
/// use dstretch_core::luma601;
///
/// assert!((luma601([255.0, 255.0, 255.0]) - 255.0).abs() < 1e-9);
/// ```
#[inline]
pub fn luma601(rgb: [f64; 3]) -> f64 {
    REC601_LUMA_R * rgb[0] + REC601_LUMA_G * rgb[1] + REC601_LUMA_B * rgb[2]
}

/// Re-quantizes a value on the 0..255 scale to `u8`.
///
/// Rounds to nearest (half away from zero) and clamps to `[0, 255]`.
/// NaN maps to 0.
///
/// ```rust
/// use dstretch_core::quantize;
///
/// assert_eq!(quantize(127.5), 128);
/// assert_eq!(quantize(-3.0), 0);
/// assert_eq!(quantize(300.0), 255);
/// assert_eq!(quantize(f64::NAN), 0);
/// ```
#[inline]
pub fn quantize(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_luma_weights_sum_to_one() {
        let sum: f64 = REC601_LUMA.iter().sum();
        assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_luma_of_primaries() {
        assert_abs_diff_eq!(luma601([255.0, 0.0, 0.0]), 76.245, epsilon = 1e-9);
        assert_abs_diff_eq!(luma601([0.0, 1.0, 0.0]), REC601_LUMA_G);
        assert_abs_diff_eq!(luma601([0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_quantize_rounding() {
        assert_eq!(quantize(0.49), 0);
        assert_eq!(quantize(0.5), 1);
        assert_eq!(quantize(254.6), 255);
        assert_eq!(quantize(127.999_999), 128);
    }
}
