//! FFT band-pass filtering.
//!
//! The plane is mirror-padded to at least twice its size (rounded up to a
//! power of two), transformed with
//! [`rustfft`], multiplied by a Gaussian band-pass, and transformed back.
//! Structure sizes are given in pixels:
//!
//! ```text
//! H(f) = (1 - exp(-(f * large)^2)) * exp(-(f * small)^2)     f in cycles/pixel
//! ```
//!
//! The DC term is always kept, so the mean of the plane survives.
//!
//! # Example
//!
//! ```rust
//! use dstretch_ops::fft::bandpass;
//!
//! let flat = vec![100.0; 32 * 32];
//! let out = bandpass(&flat, 32, 32, 10.0, 2.0, false).unwrap();
//! assert!(out.iter().all(|v| (v - 100.0).abs() < 1e-9));
//! ```

use crate::filter::check_plane;
use crate::{OpsError, OpsResult};
use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};
use tracing::trace;

/// Gaussian band-pass in the frequency domain.
///
/// * `filter_large` - structures larger than this (pixels) are attenuated
/// * `filter_small` - structures smaller than this are attenuated; `0` disables
/// * `suppress_stripes` - also removes horizontal stripes (the `fx = 0` line)
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] unless `0 <= filter_small < filter_large`.
pub fn bandpass(
    src: &[f64],
    width: usize,
    height: usize,
    filter_large: f64,
    filter_small: f64,
    suppress_stripes: bool,
) -> OpsResult<Vec<f64>> {
    check_plane(src, width, height)?;
    if !(filter_small >= 0.0 && filter_large > filter_small) {
        return Err(OpsError::invalid_parameter(format!(
            "band-pass needs 0 <= filter_small < filter_large, got {} and {}",
            filter_small, filter_large
        )));
    }
    if src.is_empty() {
        return Ok(Vec::new());
    }

    let pw = (2 * width).next_power_of_two();
    let ph = (2 * height).next_power_of_two();
    trace!(width, height, pw, ph, filter_large, filter_small, "bandpass");

    let mut buf: Vec<Complex<f64>> = (0..pw * ph)
        .map(|i| {
            let sx = mirror(i % pw, width);
            let sy = mirror(i / pw, height);
            Complex::new(src[sy * width + sx], 0.0)
        })
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    let row_fwd = planner.plan_fft_forward(pw);
    let col_fwd = planner.plan_fft_forward(ph);
    let row_inv = planner.plan_fft_inverse(pw);
    let col_inv = planner.plan_fft_inverse(ph);

    // Forward: rows, then columns through a transposed copy
    buf.par_chunks_mut(pw).for_each(|row| row_fwd.process(row));
    let mut cols = transpose_complex(&buf, pw, ph);
    cols.par_chunks_mut(ph).for_each(|col| col_fwd.process(col));

    // cols is indexed [fx][fy]
    let large_sq = filter_large * filter_large;
    let small_sq = filter_small * filter_small;
    cols.par_chunks_mut(ph).enumerate().for_each(|(kx, col)| {
        let fx = signed_freq(kx, pw);
        for (ky, c) in col.iter_mut().enumerate() {
            if kx == 0 && ky == 0 {
                continue;
            }
            if suppress_stripes && kx == 0 {
                *c = Complex::new(0.0, 0.0);
                continue;
            }
            let fy = signed_freq(ky, ph);
            let f_sq = fx * fx + fy * fy;
            let gain = (1.0 - (-f_sq * large_sq).exp()) * (-f_sq * small_sq).exp();
            *c *= gain;
        }
    });

    cols.par_chunks_mut(ph).for_each(|col| col_inv.process(col));
    let mut rows = transpose_complex(&cols, ph, pw);
    rows.par_chunks_mut(pw).for_each(|row| row_inv.process(row));

    let norm = 1.0 / (pw * ph) as f64;
    let mut out = vec![0.0f64; width * height];
    out.par_chunks_mut(width).enumerate().for_each(|(y, line)| {
        for (x, v) in line.iter_mut().enumerate() {
            *v = rows[y * pw + x].re * norm;
        }
    });
    Ok(out)
}

/// Frequency in cycles per pixel of FFT bin `k` out of `n`.
#[inline]
fn signed_freq(k: usize, n: usize) -> f64 {
    let k = if k <= n / 2 { k as f64 } else { k as f64 - n as f64 };
    k / n as f64
}

/// Reflects `i` into `0..n` (whole-sample symmetric).
#[inline]
fn mirror(i: usize, n: usize) -> usize {
    let m = i % (2 * n);
    if m < n { m } else { 2 * n - 1 - m }
}

fn transpose_complex(src: &[Complex<f64>], width: usize, height: usize) -> Vec<Complex<f64>> {
    let mut dst = vec![Complex::new(0.0, 0.0); width * height];
    dst.par_chunks_mut(height).enumerate().for_each(|(x, col)| {
        for (y, v) in col.iter_mut().enumerate() {
            *v = src[y * width + x];
        }
    });
    dst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror() {
        assert_eq!(mirror(0, 3), 0);
        assert_eq!(mirror(3, 3), 2);
        assert_eq!(mirror(5, 3), 0);
        assert_eq!(mirror(6, 3), 0);
    }

    #[test]
    fn test_removes_gradient_keeps_mean() {
        let (w, h) = (64, 64);
        let src: Vec<f64> = (0..w * h).map(|i| 50.0 + (i % w) as f64 * 2.0).collect();
        let mean_in = src.iter().sum::<f64>() / src.len() as f64;
        let out = bandpass(&src, w, h, 20.0, 0.0, false).unwrap();
        let mean_out = out.iter().sum::<f64>() / out.len() as f64;
        assert!((mean_out - mean_in).abs() < 1.0);

        let range = |v: &[f64]| {
            v.iter().cloned().fold(f64::MIN, f64::max) - v.iter().cloned().fold(f64::MAX, f64::min)
        };
        assert!(range(&out) < range(&src) * 0.5);
    }

    #[test]
    fn test_rejects_inverted_band() {
        let src = vec![0.0; 16];
        let err = bandpass(&src, 4, 4, 2.0, 3.0, false).unwrap_err();
        assert!(matches!(err, OpsError::InvalidParameter(_)));
    }

    #[test]
    fn test_suppress_stripes() {
        let (w, h) = (32, 32);
        // horizontal stripes: constant along x, alternating along y
        let src: Vec<f64> = (0..w * h)
            .map(|i| if (i / w) % 4 < 2 { 80.0 } else { 120.0 })
            .collect();
        let out = bandpass(&src, w, h, 1000.0, 0.0, true).unwrap();
        assert!(out.iter().all(|v| (v - 100.0).abs() < 1e-6));
    }
}
