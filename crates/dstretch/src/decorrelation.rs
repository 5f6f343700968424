//! The decorrelation stretch.
//!
//! Two routes, chosen by the colorspace:
//!
//! ```text
//! Statistical   RGB -> space -> mean, covariance -> eigen -> M = V diag(s / sqrt(l)) Vt
//!               s = scale * scale_adjust
//! FixedMatrix   RGB -> base  -> mean               -> M = matrix * scale / 10
//!
//! both          x' = M (x - mean) + mean  ->  back to RGB
//! ```
//!
//! Eigenvalues below [`EIGENVALUE_FLOOR`] are raised to it, so flat input
//! saturates instead of dividing by zero: every pixel sits on the mean, and
//! the output equals the input.

use crate::{DstretchError, DstretchResult};
use dstretch_color::{ColorspaceDescriptor, ColorspaceRegistry, DecorrelationRoute};
use dstretch_core::{FloatImage, RgbImage, SelectionMask};
use dstretch_math::{ColorStatistics, Mat3, SymmetricEigen, Vec3, EIGENVALUE_FLOOR};
use rayon::prelude::*;
use tracing::{debug, trace, warn};

/// Smallest accepted scale.
pub const MIN_SCALE: f64 = 1.0;
/// Largest accepted scale.
pub const MAX_SCALE: f64 = 100.0;
/// Scale used when none is given.
pub const DEFAULT_SCALE: f64 = 15.0;
/// Colorspace used when none is given.
pub const DEFAULT_COLORSPACE: &str = "YDS";

/// Output of one decorrelation run.
///
/// Holds the enhanced image together with everything needed to explain it.
/// `original` shares its pixels with the caller's buffer.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// Enhanced image
    pub image: RgbImage,
    /// Input image
    pub original: RgbImage,
    /// Colorspace name
    pub colorspace: String,
    /// Requested scale
    pub scale: f64,
    /// Route taken
    pub route: DecorrelationRoute,
    /// Stretch matrix `M`
    pub transform_matrix: Mat3,
    /// Mean the stretch was centered on, in the working space
    pub color_mean: Vec3,
    /// Eigen analysis; `None` on the fixed-matrix route
    pub eigen: Option<SymmetricEigen>,
}

impl ProcessingResult {
    /// Enhanced image.
    #[inline]
    pub fn processed_image(&self) -> &RgbImage {
        &self.image
    }

    /// Input image.
    #[inline]
    pub fn original_image(&self) -> &RgbImage {
        &self.original
    }
}

/// Decorrelation stretch engine.
///
/// Stateless apart from its registry; calls take `&self` and can run from
/// several threads at once. Use [`Session`](crate::Session) to keep the last
/// original/processed pair.
///
/// ```rust
/// use dstretch::DecorrelationStretch;
/// use dstretch_core::RgbImage;
///
/// let engine = DecorrelationStretch::new();
/// let img = RgbImage::from_fn(32, 32, |x, y| [120 + (x % 5) as u8, 100 + (y % 3) as u8, 90]);
/// let result = engine.process(&img, "LDS", 20.0, None).unwrap();
///
/// assert_eq!(result.image.dimensions(), img.dimensions());
/// assert!(result.eigen.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct DecorrelationStretch {
    registry: ColorspaceRegistry,
}

impl Default for DecorrelationStretch {
    fn default() -> Self {
        Self::new()
    }
}

impl DecorrelationStretch {
    /// Engine over the built-in colorspaces.
    pub fn new() -> Self {
        Self::with_registry(ColorspaceRegistry::with_builtins())
    }

    /// Engine over a custom registry.
    pub fn with_registry(registry: ColorspaceRegistry) -> Self {
        Self { registry }
    }

    /// Colorspace catalog.
    #[inline]
    pub fn registry(&self) -> &ColorspaceRegistry {
        &self.registry
    }

    /// Adds or replaces a colorspace.
    pub fn register(&mut self, descriptor: ColorspaceDescriptor) -> Option<ColorspaceDescriptor> {
        self.registry.register(descriptor)
    }

    /// Runs the stretch.
    ///
    /// All validation happens before any pixel work.
    ///
    /// # Errors
    ///
    /// - `InvalidImage` for an empty or malformed image
    /// - `UnknownColorspace` for an unregistered name
    /// - `ScaleOutOfRange` unless `1.0 <= scale <= 100.0`
    /// - `InvalidMask` for a mask of the wrong size or with no pixels selected
    pub fn process(
        &self,
        image: &RgbImage,
        colorspace: &str,
        scale: f64,
        mask: Option<&SelectionMask>,
    ) -> DstretchResult<ProcessingResult> {
        image.ensure_valid()?;
        let descriptor = self.registry.get(colorspace)?;
        check_scale(scale)?;
        if let Some(mask) = mask {
            mask.check_matches(image.width(), image.height())?;
        }

        let route = descriptor.route();
        debug!(
            colorspace,
            scale,
            masked = mask.is_some(),
            width = image.width(),
            height = image.height(),
            "decorrelate"
        );

        let (out, transform_matrix, color_mean, eigen) = match route {
            DecorrelationRoute::FixedMatrix { base, matrix } => {
                trace!(base = base.name(), "fixed-matrix route");
                let working = base.to_space(image);
                let mean = ColorStatistics::mean_only(&working, mask)?;
                let m = matrix * (scale / 10.0);
                let stretched = apply_stretch(&working, &m, mean);
                (base.from_space(&stretched), m, mean, None)
            }
            DecorrelationRoute::Statistical { scale_adjust } => {
                let adjusted = scale * scale_adjust;
                trace!(scale_adjust, adjusted, "statistical route");
                let working = descriptor.to_space(image);
                let stats = ColorStatistics::compute(&working, mask)?;
                let eigen = SymmetricEigen::new(&stats.covariance).clamp_floor(EIGENVALUE_FLOOR);
                trace!(values = ?eigen.values, "eigenvalues");
                if eigen.clamped > 0 {
                    warn!(
                        clamped = eigen.clamped,
                        "degenerate covariance, eigenvalues raised to floor"
                    );
                }
                let m = eigen.compose(|l| adjusted / l.sqrt());
                let stretched = apply_stretch(&working, &m, stats.mean);
                (descriptor.from_space(&stretched), m, stats.mean, Some(eigen))
            }
        };

        Ok(ProcessingResult {
            image: out,
            original: image.clone(),
            colorspace: colorspace.to_string(),
            scale,
            route,
            transform_matrix,
            color_mean,
            eigen,
        })
    }
}

/// Fails with [`DstretchError::ScaleOutOfRange`] outside `1.0..=100.0`.
pub fn check_scale(scale: f64) -> DstretchResult<()> {
    if !(MIN_SCALE..=MAX_SCALE).contains(&scale) {
        return Err(DstretchError::ScaleOutOfRange(scale));
    }
    Ok(())
}

/// `x' = M (x - mean) + mean` for every pixel.
fn apply_stretch(image: &FloatImage, m: &Mat3, mean: Vec3) -> FloatImage {
    let mut out = image.clone();
    out.pixels_mut()
        .par_iter_mut()
        .for_each(|p| *p = m.apply_about(*p, mean));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use dstretch_color::builtin::CRGB_MATRIX;
    use dstretch_core::{quantize, ErrorKind};

    fn varied() -> RgbImage {
        RgbImage::from_fn(24, 24, |x, y| {
            [
                (100 + (x * 3) % 40) as u8,
                (90 + (y * 5) % 30) as u8,
                (80 + (x + y) % 20) as u8,
            ]
        })
    }

    #[test]
    fn test_uniform_gray_unchanged() {
        let img = RgbImage::filled(10, 10, [128, 128, 128]);
        let r = DecorrelationStretch::new().process(&img, "YDS", 15.0, None).unwrap();
        assert_eq!(r.image, img);
        let eigen = r.eigen.unwrap();
        assert_eq!(eigen.clamped, 3);
    }

    #[test]
    fn test_crgb_uses_scaled_constant_matrix() {
        let img = RgbImage::from_fn(10, 10, |x, _| {
            if x < 5 { [200, 50, 50] } else { [50, 50, 200] }
        });
        let r = DecorrelationStretch::new().process(&img, "CRGB", 10.0, None).unwrap();
        assert!(r.eigen.is_none());
        assert!(r.transform_matrix.max_abs_diff(&CRGB_MATRIX) < 1e-15);

        let mean = r.color_mean;
        assert_abs_diff_eq!(mean.x, 125.0 / 255.0, epsilon = 1e-12);
        for (x, input) in [(0, [200u8, 50, 50]), (9, [50, 50, 200])] {
            let p = input.map(|c| c as f64 / 255.0);
            let expected = CRGB_MATRIX.apply_about(p, mean).map(|c| quantize(c * 255.0));
            assert_eq!(r.image.pixel(x, 0), expected);
        }
    }

    #[test]
    fn test_crgb_scale_factor() {
        let img = varied();
        let r = DecorrelationStretch::new().process(&img, "CRGB", 25.0, None).unwrap();
        assert!(r.transform_matrix.max_abs_diff(&(CRGB_MATRIX * 2.5)) < 1e-12);
    }

    #[test]
    fn test_validation_order_and_kinds() {
        let engine = DecorrelationStretch::new();
        let img = varied();

        let err = engine.process(&RgbImage::new(0, 0), "NOPE", 0.0, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidImage);
        let err = engine.process(&img, "NOPE", 0.0, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownColorspace);
        for bad in [0.5, 100.5, f64::NAN] {
            let err = engine.process(&img, "YDS", bad, None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ScaleOutOfRange);
        }
        let mask = SelectionMask::full(3, 3);
        let err = engine.process(&img, "YDS", 15.0, Some(&mask)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMask);
    }

    #[test]
    fn test_statistical_matrix_is_symmetric() {
        let r = DecorrelationStretch::new().process(&varied(), "YDS", 15.0, None).unwrap();
        let m = r.transform_matrix;
        assert!(m.max_abs_diff(&m.transpose()) < 1e-9);
        assert_eq!(r.route, DecorrelationRoute::Statistical { scale_adjust: 0.010 });
    }

    #[test]
    fn test_mask_restricts_statistics() {
        let img = RgbImage::from_fn(20, 20, |x, _| {
            if x < 10 { [60, 60, 60] } else { [200, 40, 40] }
        });
        let mask = SelectionMask::rect(20, 20, 0, 0, 10, 20);
        let r = DecorrelationStretch::new().process(&img, "RGB", 15.0, Some(&mask)).unwrap();
        assert_abs_diff_eq!(r.color_mean.x, 60.0 / 255.0, epsilon = 1e-12);
    }
}
