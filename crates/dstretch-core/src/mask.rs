//! Boolean pixel selection.
//!
//! A [`SelectionMask`] restricts which pixels contribute to statistics.
//! It never restricts which pixels are transformed.

use crate::{Error, Result};

/// Row-major boolean mask with the same dimensions as the image it selects from.
///
/// ```rust
/// use dstretch_core::SelectionMask;
///
/// let mask = SelectionMask::rect(10, 10, 2, 2, 3, 3);
/// assert_eq!(mask.count_selected(), 9);
/// assert!(mask.is_selected(3, 3));
/// assert!(!mask.is_selected(0, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl SelectionMask {
    /// Creates a mask from row-major flags.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMask`] if `bits.len() != width * height`.
    pub fn from_raw(width: u32, height: u32, bits: Vec<bool>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if bits.len() != expected {
            return Err(Error::invalid_mask(format!(
                "expected {} flags for {}x{}, got {}",
                expected,
                width,
                height,
                bits.len()
            )));
        }
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Creates a mask by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> bool,
    {
        let mut bits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Mask selecting every pixel.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; width as usize * height as usize],
        }
    }

    /// Mask selecting the rectangle `[x, x + w) x [y, y + h)`, clipped to bounds.
    pub fn rect(width: u32, height: u32, x: u32, y: u32, w: u32, h: u32) -> Self {
        let x1 = x.saturating_add(w);
        let y1 = y.saturating_add(h);
        Self::from_fn(width, height, |px, py| px >= x && px < x1 && py >= y && py < y1)
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the flags in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Returns whether `(x, y)` is selected; out-of-bounds is `false`.
    #[inline]
    pub fn is_selected(&self, x: u32, y: u32) -> bool {
        x < self.width
            && y < self.height
            && self.bits[y as usize * self.width as usize + x as usize]
    }

    /// Number of selected pixels.
    pub fn count_selected(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Checks that the mask fits an image of the given size and selects something.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMask`] on a dimension mismatch or an empty selection.
    pub fn check_matches(&self, width: u32, height: u32) -> Result<()> {
        if self.dimensions() != (width, height) {
            return Err(Error::invalid_mask(format!(
                "mask is {}x{} but image is {}x{}",
                self.width, self.height, width, height
            )));
        }
        if !self.bits.iter().any(|b| *b) {
            return Err(Error::invalid_mask("mask selects no pixels"));
        }
        Ok(())
    }
}
