//! Plane-level spatial filters.
//!
//! Planes are single-channel `f64` rasters in row-major order. The separable
//! Gaussian runs each row on its own rayon task; the vertical pass reuses the
//! row kernel on a transposed copy so both passes parallelize over
//! independent rows.
//!
//! Borders are clamp-to-edge. Kernels longer than [`FFT_KERNEL_TAPS`]
//! convolve each row through [`rustfft`] instead of tap by tap.

use crate::{OpsError, OpsResult};
use dstretch_core::{quantize, RgbImage};
use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};
use tracing::trace;

/// Longest kernel convolved directly.
pub const FFT_KERNEL_TAPS: usize = 129;

/// Splits an image into three `f64` planes on the 0..255 scale.
pub fn split_planes(image: &RgbImage) -> [Vec<f64>; 3] {
    let n = image.pixel_count();
    let mut planes = [
        Vec::with_capacity(n),
        Vec::with_capacity(n),
        Vec::with_capacity(n),
    ];
    for p in image.pixels() {
        planes[0].push(p[0] as f64);
        planes[1].push(p[1] as f64);
        planes[2].push(p[2] as f64);
    }
    planes
}

/// Re-quantizes three planes into an image.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimensions`] if a plane is not `width * height` long.
pub fn merge_planes(width: u32, height: u32, planes: &[Vec<f64>; 3]) -> OpsResult<RgbImage> {
    let n = width as usize * height as usize;
    if planes.iter().any(|p| p.len() != n) {
        return Err(OpsError::InvalidDimensions(format!(
            "planes must hold {} samples",
            n
        )));
    }
    let mut data = vec![0u8; n * 3];
    data.par_chunks_mut(3).enumerate().for_each(|(i, px)| {
        px[0] = quantize(planes[0][i]);
        px[1] = quantize(planes[1][i]);
        px[2] = quantize(planes[2][i]);
    });
    Ok(RgbImage::from_raw(width, height, data)?)
}

/// Normalized 1D Gaussian kernel with radius `ceil(3 * sigma)`.
///
/// ```rust
/// use dstretch_ops::filter::gaussian_kernel;
///
/// let k = gaussian_kernel(2.0);
/// assert_eq!(k.len(), 13);
/// assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
/// ```
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = (3.0 * sigma).ceil() as usize;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|v| *v /= sum);
    kernel
}

/// Separable Gaussian blur of one plane.
///
/// `sigma <= 0` returns a copy.
///
/// ```rust
/// use dstretch_ops::filter::gaussian_blur;
///
/// let flat = vec![42.0; 16 * 16];
/// let out = gaussian_blur(&flat, 16, 16, 3.0).unwrap();
/// assert!(out.iter().all(|v| (v - 42.0).abs() < 1e-9));
/// ```
pub fn gaussian_blur(src: &[f64], width: usize, height: usize, sigma: f64) -> OpsResult<Vec<f64>> {
    check_plane(src, width, height)?;
    trace!(width, height, sigma, "gaussian_blur");
    if sigma <= 0.0 || src.is_empty() {
        return Ok(src.to_vec());
    }
    let kernel = gaussian_kernel(sigma);
    let horizontal = convolve_rows(src, width, height, &kernel);
    let transposed = transpose(&horizontal, width, height);
    let vertical = convolve_rows(&transposed, height, width, &kernel);
    Ok(transpose(&vertical, height, width))
}

pub(crate) fn check_plane(src: &[f64], width: usize, height: usize) -> OpsResult<()> {
    if src.len() != width * height {
        return Err(OpsError::InvalidDimensions(format!(
            "expected {} samples, got {}",
            width * height,
            src.len()
        )));
    }
    Ok(())
}

fn convolve_rows(src: &[f64], width: usize, height: usize, kernel: &[f64]) -> Vec<f64> {
    if kernel.len() > FFT_KERNEL_TAPS {
        convolve_rows_fft(src, width, height, kernel)
    } else {
        convolve_rows_direct(src, width, height, kernel)
    }
}

fn convolve_rows_direct(src: &[f64], width: usize, height: usize, kernel: &[f64]) -> Vec<f64> {
    let radius = kernel.len() / 2;
    let mut dst = vec![0.0f64; width * height];
    dst.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let line = &src[y * width..(y + 1) * width];
        for (x, out) in row.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let sx = (x + k).saturating_sub(radius).min(width - 1);
                acc += line[sx] * w;
            }
            *out = acc;
        }
    });
    dst
}

/// Same result as [`convolve_rows_direct`] for a symmetric kernel.
///
/// Each row is clamp-extended by the kernel radius on both sides; output
/// `x` is sample `x + 2 * radius` of the linear convolution, which never
/// wraps because the transform is as long as the extended row.
fn convolve_rows_fft(src: &[f64], width: usize, height: usize, kernel: &[f64]) -> Vec<f64> {
    let radius = kernel.len() / 2;
    let n = width + 2 * radius;
    trace!(width, taps = kernel.len(), n, "fft row convolution");

    let mut planner = FftPlanner::<f64>::new();
    let fwd = planner.plan_fft_forward(n);
    let inv = planner.plan_fft_inverse(n);

    let mut spectrum = vec![Complex::new(0.0, 0.0); n];
    for (s, &w) in spectrum.iter_mut().zip(kernel) {
        *s = Complex::new(w, 0.0);
    }
    fwd.process(&mut spectrum);
    let norm = 1.0 / n as f64;

    let mut dst = vec![0.0f64; width * height];
    dst.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let line = &src[y * width..(y + 1) * width];
        let mut buf: Vec<Complex<f64>> = (0..n)
            .map(|i| Complex::new(line[i.saturating_sub(radius).min(width - 1)], 0.0))
            .collect();
        fwd.process(&mut buf);
        for (b, k) in buf.iter_mut().zip(&spectrum) {
            *b *= *k;
        }
        inv.process(&mut buf);
        for (x, out) in row.iter_mut().enumerate() {
            *out = buf[x + 2 * radius].re * norm;
        }
    });
    dst
}

/// Transposes a plane: `(x, y)` moves to `(y, x)`.
pub(crate) fn transpose(src: &[f64], width: usize, height: usize) -> Vec<f64> {
    let mut dst = vec![0.0f64; width * height];
    dst.par_chunks_mut(height.max(1))
        .enumerate()
        .for_each(|(x, col)| {
            for (y, v) in col.iter_mut().enumerate() {
                *v = src[y * width + x];
            }
        });
    dst
}

/// Mean of each `block x block` tile (edge tiles may be smaller).
pub fn block_means(src: &[f64], width: usize, height: usize, block: usize) -> Vec<f64> {
    let block = block.max(1);
    let mut means = Vec::new();
    for by in (0..height).step_by(block) {
        for bx in (0..width).step_by(block) {
            let y1 = (by + block).min(height);
            let x1 = (bx + block).min(width);
            let mut sum = 0.0;
            for y in by..y1 {
                sum += src[y * width + bx..y * width + x1].iter().sum::<f64>();
            }
            means.push(sum / ((y1 - by) * (x1 - bx)) as f64);
        }
    }
    means
}

/// Mean and population standard deviation.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_transpose_roundtrip() {
        let src: Vec<f64> = (0..12).map(|v| v as f64).collect();
        let t = transpose(&src, 4, 3);
        assert_eq!(t[1], 4.0);
        assert_eq!(transpose(&t, 3, 4), src);
    }

    #[test]
    fn test_blur_preserves_mass_in_interior() {
        let mut src = vec![0.0; 41 * 41];
        src[20 * 41 + 20] = 100.0;
        let out = gaussian_blur(&src, 41, 41, 2.0).unwrap();
        let total: f64 = out.iter().sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!(out[20 * 41 + 20] < 100.0);
        assert!(out[20 * 41 + 21] > 0.0);
    }

    #[test]
    fn test_fft_rows_match_direct() {
        let (w, h) = (50, 3);
        let src: Vec<f64> = (0..w * h)
            .map(|i| ((i * 37) % 101) as f64 + (i / w) as f64 * 20.0)
            .collect();
        // longer than a row, so the clamped border dominates
        let kernel = gaussian_kernel(30.0);
        assert!(kernel.len() > FFT_KERNEL_TAPS);
        let direct = convolve_rows_direct(&src, w, h, &kernel);
        let fft = convolve_rows_fft(&src, w, h, &kernel);
        for (a, b) in direct.iter().zip(&fft) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_wide_blur_on_small_plane() {
        let flat = vec![42.0; 20 * 12];
        let out = gaussian_blur(&flat, 20, 12, 1000.0).unwrap();
        for v in &out {
            assert_abs_diff_eq!(*v, 42.0, epsilon = 1e-9);
        }

        let ramp: Vec<f64> = (0..20 * 12).map(|i| (i % 20) as f64).collect();
        let out = gaussian_blur(&ramp, 20, 12, 1000.0).unwrap();
        // a very wide kernel sees mostly the clamped edges
        assert!(out.iter().all(|v| (v - 9.5).abs() < 0.15));
    }

    #[test]
    fn test_blur_rejects_bad_length() {
        assert!(gaussian_blur(&[0.0; 5], 2, 2, 1.0).is_err());
    }

    #[test]
    fn test_split_merge() {
        let img = RgbImage::from_fn(5, 3, |x, y| [x as u8, y as u8, 7]);
        let planes = split_planes(&img);
        assert_eq!(merge_planes(5, 3, &planes).unwrap(), img);
    }

    #[test]
    fn test_block_means() {
        let src = vec![1.0, 3.0, 5.0, 1.0, 3.0, 5.0];
        assert_eq!(block_means(&src, 3, 2, 2), vec![2.0, 5.0]);
        assert_eq!(mean_std(&[2.0, 4.0]), (3.0, 1.0));
    }
}
