//! HSV conversion.
//!
//! Hue is in degrees `[0, 360)`, saturation and value in `0..=1`.
//! Achromatic pixels report hue 0.

/// Converts RGB (`0..=1`) to `[h, s, v]`.
///
/// ```rust
/// use dstretch_color::hsv::rgb_to_hsv;
///
/// assert_eq!(rgb_to_hsv([0.0, 1.0, 0.0]), [120.0, 1.0, 1.0]);
/// assert_eq!(rgb_to_hsv([0.5, 0.5, 0.5]), [0.0, 0.0, 0.5]);
/// ```
pub fn rgb_to_hsv(rgb: [f64; 3]) -> [f64; 3] {
    let [r, g, b] = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };
    if delta <= 0.0 {
        return [0.0, s, v];
    }

    let h = if max == r {
        60.0 * ((g - b) / delta)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    [wrap_degrees(h), s, v]
}

/// Converts `[h, s, v]` back to RGB (`0..=1`).
pub fn hsv_to_rgb(hsv: [f64; 3]) -> [f64; 3] {
    let [h, s, v] = hsv;
    let c = v * s;
    let h_prime = wrap_degrees(h) / 60.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());

    let (r1, g1, b1) = if h_prime < 1.0 {
        (c, x, 0.0)
    } else if h_prime < 2.0 {
        (x, c, 0.0)
    } else if h_prime < 3.0 {
        (0.0, c, x)
    } else if h_prime < 4.0 {
        (0.0, x, c)
    } else if h_prime < 5.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    let m = v - c;
    [r1 + m, g1 + m, b1 + m]
}

/// Wraps any angle into `[0, 360)`.
#[inline]
pub fn wrap_degrees(h: f64) -> f64 {
    let w = h.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if w >= 360.0 { 0.0 } else { w }
}

/// Smallest absolute angular distance between two hues, in `0..=180`.
#[inline]
pub fn hue_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_primaries() {
        assert_eq!(rgb_to_hsv([1.0, 0.0, 0.0]), [0.0, 1.0, 1.0]);
        assert_eq!(rgb_to_hsv([0.0, 0.0, 1.0]), [240.0, 1.0, 1.0]);
        assert_eq!(rgb_to_hsv([1.0, 0.0, 1.0]), [300.0, 1.0, 1.0]);
    }

    #[test]
    fn test_roundtrip() {
        for rgb in [[0.8, 0.3, 0.1], [0.1, 0.7, 0.9], [0.4, 0.4, 0.2], [0.0, 0.0, 0.0]] {
            let back = hsv_to_rgb(rgb_to_hsv(rgb));
            for c in 0..3 {
                assert_abs_diff_eq!(back[c], rgb[c], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_wrap_and_distance() {
        assert_eq!(wrap_degrees(-30.0), 330.0);
        assert_eq!(wrap_degrees(720.0), 0.0);
        assert_eq!(hue_distance(350.0, 10.0), 20.0);
        assert_eq!(hue_distance(0.0, 180.0), 180.0);
    }
}
