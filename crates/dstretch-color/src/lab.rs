//! CIE L*a*b* conversion (sRGB primaries, D65 white).
//!
//! The decorrelation stretch works on a normalized form of LAB so that all
//! three channels share the unit range:
//!
//! | channel | native range | normalized |
//! |---------|--------------|------------|
//! | L | 0..100 | `L / 100` |
//! | a | -128..127 | `(a + 128) / 255` |
//! | b | -128..127 | `(b + 128) / 255` |

use dstretch_math::Mat3;

/// Linear sRGB to XYZ (D65).
pub const SRGB_TO_XYZ: Mat3 = Mat3::from_rows([
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
]);

/// XYZ (D65) to linear sRGB.
pub const XYZ_TO_SRGB: Mat3 = Mat3::from_rows([
    [3.2404542, -1.5371385, -0.4985314],
    [-0.9692660, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
]);

/// D65 reference white in XYZ.
pub const D65_WHITE: [f64; 3] = [0.95047, 1.0, 1.08883];

const DELTA: f64 = 6.0 / 29.0;

/// Decodes one sRGB-encoded value to linear light.
#[inline]
pub fn srgb_to_linear(x: f64) -> f64 {
    if x <= 0.04045 {
        x / 12.92
    } else {
        ((x + 0.055) / 1.055).powf(2.4)
    }
}

/// Encodes one linear value with the sRGB curve.
#[inline]
pub fn linear_to_srgb(x: f64) -> f64 {
    if x <= 0.0031308 {
        x * 12.92
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    }
}

#[inline]
fn lab_f(t: f64) -> f64 {
    if t > DELTA * DELTA * DELTA {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

#[inline]
fn lab_f_inv(t: f64) -> f64 {
    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

/// Converts sRGB (`0..=1`, encoded) to CIE L*a*b*.
///
/// ```rust
/// use dstretch_color::lab::rgb_to_lab;
///
/// let [l, a, b] = rgb_to_lab([1.0, 1.0, 1.0]);
/// assert!((l - 100.0).abs() < 1e-3);
/// assert!(a.abs() < 1e-2 && b.abs() < 1e-2);
/// ```
pub fn rgb_to_lab(rgb: [f64; 3]) -> [f64; 3] {
    let linear = rgb.map(srgb_to_linear);
    let xyz = SRGB_TO_XYZ.apply(linear);
    let fx = lab_f(xyz[0] / D65_WHITE[0]);
    let fy = lab_f(xyz[1] / D65_WHITE[1]);
    let fz = lab_f(xyz[2] / D65_WHITE[2]);
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// Converts CIE L*a*b* to sRGB (`0..=1` nominal, not clamped).
pub fn lab_to_rgb(lab: [f64; 3]) -> [f64; 3] {
    let fy = (lab[0] + 16.0) / 116.0;
    let fx = fy + lab[1] / 500.0;
    let fz = fy - lab[2] / 200.0;
    let xyz = [
        lab_f_inv(fx) * D65_WHITE[0],
        lab_f_inv(fy) * D65_WHITE[1],
        lab_f_inv(fz) * D65_WHITE[2],
    ];
    XYZ_TO_SRGB.apply(xyz).map(linear_to_srgb)
}

/// Maps native LAB to the unit range used for stretching.
#[inline]
pub fn normalize_lab(lab: [f64; 3]) -> [f64; 3] {
    [lab[0] / 100.0, (lab[1] + 128.0) / 255.0, (lab[2] + 128.0) / 255.0]
}

/// Maps normalized LAB back to native ranges, clipping L to `0..=100`
/// and a/b to `-128..=127`.
#[inline]
pub fn denormalize_lab(n: [f64; 3]) -> [f64; 3] {
    [
        (n[0] * 100.0).clamp(0.0, 100.0),
        (n[1] * 255.0 - 128.0).clamp(-128.0, 127.0),
        (n[2] * 255.0 - 128.0).clamp(-128.0, 127.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_black_and_white() {
        let black = rgb_to_lab([0.0, 0.0, 0.0]);
        assert_abs_diff_eq!(black[0], 0.0, epsilon = 1e-9);

        let white = rgb_to_lab([1.0, 1.0, 1.0]);
        assert_abs_diff_eq!(white[0], 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_red_reference() {
        // sRGB red is roughly L=53.24, a=80.09, b=67.20
        let lab = rgb_to_lab([1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(lab[0], 53.24, epsilon = 0.05);
        assert_abs_diff_eq!(lab[1], 80.09, epsilon = 0.1);
        assert_abs_diff_eq!(lab[2], 67.20, epsilon = 0.1);
    }

    #[test]
    fn test_roundtrip() {
        for rgb in [[0.2, 0.4, 0.6], [0.9, 0.1, 0.05], [0.0, 1.0, 0.5], [0.001, 0.002, 0.003]] {
            let back = lab_to_rgb(rgb_to_lab(rgb));
            for c in 0..3 {
                assert_abs_diff_eq!(back[c], rgb[c], epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_denormalize_clips() {
        let lab = denormalize_lab([1.5, -1.0, 2.0]);
        assert_eq!(lab, [100.0, -128.0, 127.0]);
    }

    #[test]
    fn test_srgb_curve_inverse() {
        for i in 0..=20 {
            let x = i as f64 / 20.0;
            assert_abs_diff_eq!(linear_to_srgb(srgb_to_linear(x)), x, epsilon = 1e-12);
        }
    }
}
