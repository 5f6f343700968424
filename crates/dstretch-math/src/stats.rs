//! Mean and covariance of a 3-channel raster.
//!
//! Reductions run over fixed chunks of [`CHUNK_PIXELS`] pixels. Each chunk is
//! summed on its own rayon task and the partial sums are merged strictly in
//! chunk order, so the result is bit-identical for any thread count.
//!
//! Covariance is computed in a second pass over mean-centered samples, which
//! keeps precision on images whose values sit far from zero.

use crate::{Mat3, Vec3};
use dstretch_core::{Error, FloatImage, Result, SelectionMask};
use rayon::prelude::*;

/// Pixels per reduction chunk.
pub const CHUNK_PIXELS: usize = 4096;

/// Per-channel mean and 3x3 sample covariance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStatistics {
    /// Channel means
    pub mean: Vec3,
    /// Unbiased sample covariance (denominator `n - 1`, or 1 when `n == 1`)
    pub covariance: Mat3,
    /// Number of pixels that contributed
    pub count: usize,
}

impl ColorStatistics {
    /// Computes mean and covariance over every pixel, or over the pixels
    /// selected by `mask`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidImage`] if the raster is empty
    /// - [`Error::InvalidMask`] if the mask size differs or selects nothing
    ///
    /// ```rust
    /// use dstretch_core::{FloatImage, SelectionMask};
    /// use dstretch_math::ColorStatistics;
    ///
    /// let img = FloatImage::from_pixels(
    ///     3, 1,
    ///     vec![[1.0, 0.0, 0.0], [3.0, 0.0, 0.0], [100.0, 0.0, 0.0]],
    /// ).unwrap();
    /// let mask = SelectionMask::from_raw(3, 1, vec![true, true, false]).unwrap();
    ///
    /// let stats = ColorStatistics::compute(&img, Some(&mask)).unwrap();
    /// assert_eq!(stats.count, 2);
    /// assert_eq!(stats.mean.x, 2.0);
    /// assert_eq!(stats.covariance.m[0][0], 2.0);
    /// ```
    pub fn compute(image: &FloatImage, mask: Option<&SelectionMask>) -> Result<Self> {
        let (mean, count) = channel_mean(image, mask)?;
        let pixels = image.pixels();

        let partials: Vec<[f64; 6]> = match mask {
            Some(mask) => pixels
                .par_chunks(CHUNK_PIXELS)
                .zip(mask.as_slice().par_chunks(CHUNK_PIXELS))
                .map(|(px, sel)| {
                    centered_products(px.iter().zip(sel).filter(|(_, s)| **s).map(|(p, _)| p), mean)
                })
                .collect(),
            None => pixels
                .par_chunks(CHUNK_PIXELS)
                .map(|px| centered_products(px.iter(), mean))
                .collect(),
        };

        let mut acc = [0.0f64; 6];
        for part in &partials {
            for (a, p) in acc.iter_mut().zip(part) {
                *a += p;
            }
        }

        let denom = count.saturating_sub(1).max(1) as f64;
        let [xx, xy, xz, yy, yz, zz] = acc.map(|v| v / denom);
        let covariance = Mat3::from_rows([[xx, xy, xz], [xy, yy, yz], [xz, yz, zz]]);

        Ok(Self {
            mean,
            covariance,
            count,
        })
    }

    /// Computes only the channel means.
    ///
    /// Fails under the same conditions as [`compute`](Self::compute).
    pub fn mean_only(image: &FloatImage, mask: Option<&SelectionMask>) -> Result<Vec3> {
        channel_mean(image, mask).map(|(mean, _)| mean)
    }

    /// Per-channel standard deviations (square roots of the diagonal).
    pub fn std_dev(&self) -> Vec3 {
        Vec3::new(
            self.covariance.m[0][0].max(0.0).sqrt(),
            self.covariance.m[1][1].max(0.0).sqrt(),
            self.covariance.m[2][2].max(0.0).sqrt(),
        )
    }
}

fn channel_mean(image: &FloatImage, mask: Option<&SelectionMask>) -> Result<(Vec3, usize)> {
    let (w, h) = image.dimensions();
    if image.pixel_count() == 0 {
        return Err(Error::invalid_image(format!("{}x{} raster has zero area", w, h)));
    }
    if let Some(mask) = mask {
        mask.check_matches(w, h)?;
    }

    let pixels = image.pixels();
    let partials: Vec<([f64; 3], usize)> = match mask {
        Some(mask) => pixels
            .par_chunks(CHUNK_PIXELS)
            .zip(mask.as_slice().par_chunks(CHUNK_PIXELS))
            .map(|(px, sel)| sum_pixels(px.iter().zip(sel).filter(|(_, s)| **s).map(|(p, _)| p)))
            .collect(),
        None => pixels
            .par_chunks(CHUNK_PIXELS)
            .map(|px| sum_pixels(px.iter()))
            .collect(),
    };

    let mut sum = [0.0f64; 3];
    let mut count = 0usize;
    for (s, n) in &partials {
        sum[0] += s[0];
        sum[1] += s[1];
        sum[2] += s[2];
        count += n;
    }
    if count == 0 {
        return Err(Error::invalid_mask("mask selects no pixels"));
    }
    Ok((Vec3::from_array(sum) / count as f64, count))
}

fn sum_pixels<'a>(pixels: impl Iterator<Item = &'a [f64; 3]>) -> ([f64; 3], usize) {
    let mut sum = [0.0f64; 3];
    let mut n = 0usize;
    for p in pixels {
        sum[0] += p[0];
        sum[1] += p[1];
        sum[2] += p[2];
        n += 1;
    }
    (sum, n)
}

// Upper triangle: xx, xy, xz, yy, yz, zz
fn centered_products<'a>(pixels: impl Iterator<Item = &'a [f64; 3]>, mean: Vec3) -> [f64; 6] {
    let mut acc = [0.0f64; 6];
    for p in pixels {
        let dx = p[0] - mean.x;
        let dy = p[1] - mean.y;
        let dz = p[2] - mean.z;
        acc[0] += dx * dx;
        acc[1] += dx * dy;
        acc[2] += dx * dz;
        acc[3] += dy * dy;
        acc[4] += dy * dz;
        acc[5] += dz * dz;
    }
    acc
}
