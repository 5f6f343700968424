//! Image buffer types.
//!
//! - [`RgbImage`] - 3-channel, 8-bit buffer seen at every public boundary
//! - [`FloatImage`] - 3-channel `f64` raster used between internal stages
//!
//! # Memory Layout
//!
//! Both types store pixels in **row-major** order, top-to-bottom, with the
//! channels interleaved:
//!
//! ```text
//! RgbImage:   [R G B R G B R G B ...]  <- Row 0 (u8)
//! FloatImage: [[R,G,B] [R,G,B] ...]    <- Row 0 ([f64; 3])
//! ```
//!
//! # Ownership
//!
//! [`RgbImage`] keeps its bytes in an [`Arc<Vec<u8>>`], so cloning is cheap
//! and a result record can hold on to the input without copying it. Writes
//! go through [`Arc::make_mut`] (copy-on-write), which means no caller ever
//! observes another caller's mutation.
//!
//! Per-pixel conversions ([`RgbImage::map_pixels`], [`RgbImage::to_float`],
//! [`FloatImage::to_rgb`]) run row-parallel on [`rayon`]; every pixel is
//! independent so the output does not depend on the thread count.

use crate::{Error, Result};
use rayon::prelude::*;
use std::sync::Arc;

/// Rows handed to one rayon task by the per-pixel helpers.
const ROWS_PER_TASK: usize = 16;

/// Owned 8-bit RGB image.
///
/// Channel order is always R, G, B.
///
/// # Example
///
/// ```rust
/// use dstretch_core::RgbImage;
///
/// let img = RgbImage::from_fn(3, 2, |x, y| [x as u8 * 10, y as u8 * 10, 0]);
/// assert_eq!(img.pixel(2, 1), [20, 10, 0]);
/// assert_eq!(img.pixel_count(), 6);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct RgbImage {
    /// Pixel data buffer (Arc for cheap cloning)
    data: Arc<Vec<u8>>,
    /// Image width in pixels
    width: u32,
    /// Image height in pixels
    height: u32,
}

impl std::fmt::Debug for RgbImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RgbImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl RgbImage {
    /// Creates a black image.
    ///
    /// A zero-area image can be created but is rejected by
    /// [`ensure_valid`](Self::ensure_valid), and therefore by every operator.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: Arc::new(vec![0; width as usize * height as usize * 3]),
            width,
            height,
        }
    }

    /// Creates an image from interleaved RGB bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] if either dimension is zero or if
    /// `data.len() != width * height * 3`.
    ///
    /// ```rust
    /// use dstretch_core::RgbImage;
    ///
    /// assert!(RgbImage::from_raw(2, 1, vec![0, 0, 0, 255, 255, 255]).is_ok());
    /// assert!(RgbImage::from_raw(2, 1, vec![0, 0, 0]).is_err());
    /// ```
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_image(format!(
                "{}x{} image has zero area",
                width, height
            )));
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(Error::invalid_image(format!(
                "expected {} bytes for {}x{} RGB, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
        })
    }

    /// Creates an image filled with one color.
    pub fn filled(width: u32, height: u32, pixel: [u8; 3]) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * 3);
        for _ in 0..count {
            data.extend_from_slice(&pixel);
        }
        Self {
            data: Arc::new(data),
            width,
            height,
        }
    }

    /// Creates an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> [u8; 3],
    {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            data: Arc::new(data),
            width,
            height,
        }
    }

    /// Returns the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if the image has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Checks that the buffer is a well-formed, non-empty RGB image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] for zero-area images.
    pub fn ensure_valid(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::invalid_image(format!(
                "{}x{} image has zero area",
                self.width, self.height
            )));
        }
        debug_assert_eq!(self.data.len(), self.pixel_count() * 3);
        Ok(())
    }

    /// Returns the raw interleaved bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the image and returns its bytes, cloning only if shared.
    pub fn into_raw(self) -> Vec<u8> {
        Arc::try_unwrap(self.data).unwrap_or_else(|shared| (*shared).clone())
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    /// Returns the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let o = self.offset(x, y);
        [self.data[o], self.data[o + 1], self.data[o + 2]]
    }

    /// Returns the pixel at `(x, y)`, or `None` if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        (x < self.width && y < self.height).then(|| self.pixel(x, y))
    }

    /// Sets the pixel at `(x, y)` (copy-on-write).
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: [u8; 3]) {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let o = self.offset(x, y);
        Arc::make_mut(&mut self.data)[o..o + 3].copy_from_slice(&pixel);
    }

    /// Iterates over pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Returns `true` if both images have the same dimensions.
    #[inline]
    pub fn same_size(&self, other: &RgbImage) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Returns `true` if both images share the same pixel allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &RgbImage) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Produces a new image by applying `f` to every pixel.
    ///
    /// ```rust
    /// use dstretch_core::RgbImage;
    ///
    /// let img = RgbImage::filled(8, 8, [10, 20, 30]);
    /// let inv = img.map_pixels(|[r, g, b]| [255 - r, 255 - g, 255 - b]);
    /// assert_eq!(inv.pixel(7, 7), [245, 235, 225]);
    /// ```
    pub fn map_pixels<F>(&self, f: F) -> RgbImage
    where
        F: Fn([u8; 3]) -> [u8; 3] + Sync,
    {
        let mut out = vec![0u8; self.data.len()];
        let row_len = (self.width as usize * 3).max(1);
        out.par_chunks_mut(row_len * ROWS_PER_TASK)
            .zip(self.data.par_chunks(row_len * ROWS_PER_TASK))
            .for_each(|(dst, src)| {
                for (d, s) in dst.chunks_exact_mut(3).zip(src.chunks_exact(3)) {
                    d.copy_from_slice(&f([s[0], s[1], s[2]]));
                }
            });
        RgbImage {
            data: Arc::new(out),
            width: self.width,
            height: self.height,
        }
    }

    /// Converts every pixel to a float triplet with `f`.
    pub fn to_float<F>(&self, f: F) -> FloatImage
    where
        F: Fn([u8; 3]) -> [f64; 3] + Sync,
    {
        let mut out = vec![[0.0f64; 3]; self.pixel_count()];
        let row_len = (self.width as usize).max(1);
        out.par_chunks_mut(row_len * ROWS_PER_TASK)
            .zip(self.data.par_chunks(row_len * 3 * ROWS_PER_TASK))
            .for_each(|(dst, src)| {
                for (d, s) in dst.iter_mut().zip(src.chunks_exact(3)) {
                    *d = f([s[0], s[1], s[2]]);
                }
            });
        FloatImage {
            data: out,
            width: self.width,
            height: self.height,
        }
    }

    /// Converts to a float raster on the `0.0..=1.0` scale.
    pub fn to_normalized(&self) -> FloatImage {
        self.to_float(|p| [p[0] as f64 / 255.0, p[1] as f64 / 255.0, p[2] as f64 / 255.0])
    }

    /// Converts to a float raster on the `0.0..=255.0` scale.
    pub fn to_f64(&self) -> FloatImage {
        self.to_float(|p| [p[0] as f64, p[1] as f64, p[2] as f64])
    }

    /// Returns the mean of each channel on the 0..255 scale.
    ///
    /// Sums are exact integers, so the result does not depend on
    /// summation order.
    pub fn channel_means(&self) -> [f64; 3] {
        let n = self.pixel_count();
        if n == 0 {
            return [0.0; 3];
        }
        let mut sums = [0u64; 3];
        for p in self.pixels() {
            sums[0] += p[0] as u64;
            sums[1] += p[1] as u64;
            sums[2] += p[2] as u64;
        }
        [
            sums[0] as f64 / n as f64,
            sums[1] as f64 / n as f64,
            sums[2] as f64 / n as f64,
        ]
    }

    /// Extracts one channel as a byte plane.
    ///
    /// # Panics
    ///
    /// Panics if `channel > 2`.
    pub fn channel(&self, channel: usize) -> Vec<u8> {
        assert!(channel < 3, "channel index out of range");
        self.data.iter().skip(channel).step_by(3).copied().collect()
    }
}

/// Owned double precision 3-channel raster.
///
/// Produced by colorspace forward transforms and consumed by their inverse;
/// values are not range-limited.
#[derive(Clone, PartialEq)]
pub struct FloatImage {
    data: Vec<[f64; 3]>,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for FloatImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FloatImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl FloatImage {
    /// Creates a zero-filled raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![[0.0; 3]; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Creates a raster from pixel triplets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] if `pixels.len() != width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<[f64; 3]>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(Error::invalid_image(format!(
                "expected {} pixels for {}x{}, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            data: pixels,
            width,
            height,
        })
    }

    /// Creates a raster from three channel planes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] if any plane is not `width * height` long.
    pub fn from_planes(width: u32, height: u32, planes: [&[f64]; 3]) -> Result<Self> {
        let expected = width as usize * height as usize;
        if planes.iter().any(|p| p.len() != expected) {
            return Err(Error::invalid_image(format!(
                "channel planes must hold {} samples",
                expected
            )));
        }
        let data = (0..expected)
            .map(|i| [planes[0][i], planes[1][i], planes[2][i]])
            .collect();
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the raster width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the raster height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }

    /// Returns all pixels in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[[f64; 3]] {
        &self.data
    }

    /// Returns all pixels mutably.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [[f64; 3]] {
        &mut self.data
    }

    /// Returns the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [f64; 3] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Produces a new raster by applying `f` to every pixel.
    pub fn map<F>(&self, f: F) -> FloatImage
    where
        F: Fn([f64; 3]) -> [f64; 3] + Sync,
    {
        let data = self.data.par_iter().map(|p| f(*p)).collect();
        FloatImage {
            data,
            width: self.width,
            height: self.height,
        }
    }

    /// Applies `f` to every pixel in place.
    pub fn map_in_place<F>(&mut self, f: F)
    where
        F: Fn([f64; 3]) -> [f64; 3] + Sync,
    {
        self.data.par_iter_mut().for_each(|p| *p = f(*p));
    }

    /// Quantizes back to 8-bit with `f`.
    pub fn to_rgb<F>(&self, f: F) -> RgbImage
    where
        F: Fn([f64; 3]) -> [u8; 3] + Sync,
    {
        let mut out = vec![0u8; self.data.len() * 3];
        out.par_chunks_mut(3)
            .zip(self.data.par_iter())
            .for_each(|(d, p)| d.copy_from_slice(&f(*p)));
        RgbImage {
            data: Arc::new(out),
            width: self.width,
            height: self.height,
        }
    }

    /// Extracts one channel as a plane.
    ///
    /// # Panics
    ///
    /// Panics if `channel > 2`.
    pub fn channel(&self, channel: usize) -> Vec<f64> {
        assert!(channel < 3, "channel index out of range");
        self.data.iter().map(|p| p[channel]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_from_raw_validates_length() {
        let err = RgbImage::from_raw(4, 4, vec![0; 10]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidImage);
    }

    #[test]
    fn test_from_raw_rejects_zero_area() {
        assert!(RgbImage::from_raw(0, 4, vec![]).is_err());
    }

    #[test]
    fn test_ensure_valid() {
        assert!(RgbImage::new(0, 0).ensure_valid().is_err());
        assert!(RgbImage::new(1, 1).ensure_valid().is_ok());
    }

    #[test]
    fn test_copy_on_write() {
        let a = RgbImage::filled(2, 2, [1, 2, 3]);
        let mut b = a.clone();
        assert!(a.ptr_eq(&b));
        b.set_pixel(1, 1, [9, 9, 9]);
        assert!(!a.ptr_eq(&b));
        assert_eq!(a.pixel(1, 1), [1, 2, 3]);
        assert_eq!(b.pixel(1, 1), [9, 9, 9]);
    }

    #[test]
    fn test_map_pixels_preserves_layout() {
        let img = RgbImage::from_fn(37, 23, |x, y| [x as u8, y as u8, (x + y) as u8]);
        let out = img.map_pixels(|p| p);
        assert_eq!(out, img);
        assert_eq!(out.pixel(36, 22), [36, 22, 58]);
    }

    #[test]
    fn test_float_roundtrip() {
        let img = RgbImage::from_fn(19, 7, |x, y| [x as u8 * 13, y as u8 * 31, 200]);
        let back = img.to_normalized().to_rgb(|p| {
            [
                crate::quantize(p[0] * 255.0),
                crate::quantize(p[1] * 255.0),
                crate::quantize(p[2] * 255.0),
            ]
        });
        assert_eq!(back, img);
    }

    #[test]
    fn test_channel_means() {
        let img = RgbImage::from_fn(2, 1, |x, _| if x == 0 { [0, 100, 255] } else { [100, 100, 255] });
        assert_eq!(img.channel_means(), [50.0, 100.0, 255.0]);
    }

    #[test]
    fn test_float_from_planes() {
        let r = [1.0, 2.0];
        let g = [3.0, 4.0];
        let b = [5.0, 6.0];
        let f = FloatImage::from_planes(2, 1, [&r, &g, &b]).unwrap();
        assert_eq!(f.pixel(1, 0), [2.0, 4.0, 6.0]);
        assert_eq!(f.channel(2), vec![5.0, 6.0]);
    }
}
