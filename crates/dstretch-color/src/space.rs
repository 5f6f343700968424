//! Colorspace descriptors.
//!
//! A [`ColorspaceDescriptor`] pairs metadata (name, description, pigment
//! affinities) with a [`ColorspaceKind`] that knows how to move an 8-bit RGB
//! buffer into the space and back. Kinds form a closed set:
//!
//! ```text
//! Rgb            normalized RGB
//! Lab            normalized CIE LAB
//! Yuv            matrix * normalized RGB
//! LabMatrix      matrix * normalized LAB
//! BuiltinMatrix  matrix * base space, constant stretch matrix
//! ```
//!
//! The decorrelation route a descriptor takes is decided here, once, through
//! [`ColorspaceDescriptor::route`].

use crate::lab::{denormalize_lab, lab_to_rgb, normalize_lab, rgb_to_lab};
use crate::{ColorError, ColorResult};
use dstretch_core::{quantize, FloatImage, RgbImage};
use dstretch_math::Mat3;

/// Route B intensity correction for the RGB space.
pub const RGB_SCALE_ADJUST: f64 = 0.012;
/// Route B intensity correction for the YUV family.
pub const YUV_SCALE_ADJUST: f64 = 0.010;
/// Route B intensity correction for LAB and the LAB family.
pub const LAB_SCALE_ADJUST: f64 = 0.008;

/// A space computed directly from RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseSpace {
    /// RGB divided by 255
    Rgb,
    /// Normalized CIE LAB
    Lab,
}

impl BaseSpace {
    /// Registry name of the base space.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rgb => "RGB",
            Self::Lab => "LAB",
        }
    }

    /// Converts one 8-bit pixel into the base space.
    #[inline]
    pub fn forward(&self, p: [u8; 3]) -> [f64; 3] {
        let rgb = [p[0] as f64 / 255.0, p[1] as f64 / 255.0, p[2] as f64 / 255.0];
        match self {
            Self::Rgb => rgb,
            Self::Lab => normalize_lab(rgb_to_lab(rgb)),
        }
    }

    /// Converts one base-space pixel back to 8-bit RGB.
    #[inline]
    pub fn inverse(&self, p: [f64; 3]) -> [u8; 3] {
        let rgb = match self {
            Self::Rgb => p,
            Self::Lab => lab_to_rgb(denormalize_lab(p)),
        };
        rgb.map(|c| quantize(c * 255.0))
    }

    /// Converts a whole image into the base space.
    pub fn to_space(&self, image: &RgbImage) -> FloatImage {
        image.to_float(|p| self.forward(p))
    }

    /// Converts a whole base-space raster back to RGB.
    pub fn from_space(&self, image: &FloatImage) -> RgbImage {
        image.to_rgb(|p| self.inverse(p))
    }
}

/// How a descriptor converts to and from its space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorspaceKind {
    /// Normalized RGB.
    Rgb,
    /// Normalized CIE LAB.
    Lab,
    /// Fixed recombination of normalized RGB.
    Yuv {
        /// RGB to space
        forward: Mat3,
        /// Space to RGB
        inverse: Mat3,
    },
    /// Fixed recombination of normalized LAB.
    LabMatrix {
        /// LAB to space
        forward: Mat3,
        /// Space to LAB
        inverse: Mat3,
    },
    /// Constant stretch matrix over a base space.
    BuiltinMatrix {
        /// Space the matrix operates on
        base: BaseSpace,
        /// Empirically tuned matrix
        matrix: Mat3,
        /// Its inverse
        inverse: Mat3,
    },
}

impl ColorspaceKind {
    /// YUV-family kind with a computed inverse. `None` if `forward` is singular.
    pub fn yuv(forward: Mat3) -> Option<Self> {
        forward.inverse().map(|inverse| Self::Yuv { forward, inverse })
    }

    /// LAB-family kind with a computed inverse. `None` if `forward` is singular.
    pub fn lab_matrix(forward: Mat3) -> Option<Self> {
        forward.inverse().map(|inverse| Self::LabMatrix { forward, inverse })
    }

    /// Fixed-matrix kind with a computed inverse. `None` if `matrix` is singular.
    pub fn builtin_matrix(base: BaseSpace, matrix: Mat3) -> Option<Self> {
        matrix
            .inverse()
            .map(|inverse| Self::BuiltinMatrix { base, matrix, inverse })
    }

    /// Converts one 8-bit pixel into the space.
    #[inline]
    pub fn forward(&self, p: [u8; 3]) -> [f64; 3] {
        match self {
            Self::Rgb => BaseSpace::Rgb.forward(p),
            Self::Lab => BaseSpace::Lab.forward(p),
            Self::Yuv { forward, .. } => forward.apply(BaseSpace::Rgb.forward(p)),
            Self::LabMatrix { forward, .. } => forward.apply(BaseSpace::Lab.forward(p)),
            Self::BuiltinMatrix { base, matrix, .. } => matrix.apply(base.forward(p)),
        }
    }

    /// Converts one pixel of the space back to 8-bit RGB.
    #[inline]
    pub fn inverse(&self, p: [f64; 3]) -> [u8; 3] {
        match self {
            Self::Rgb => BaseSpace::Rgb.inverse(p),
            Self::Lab => BaseSpace::Lab.inverse(p),
            Self::Yuv { inverse, .. } => BaseSpace::Rgb.inverse(inverse.apply(p)),
            Self::LabMatrix { inverse, .. } => BaseSpace::Lab.inverse(inverse.apply(p)),
            Self::BuiltinMatrix { base, inverse, .. } => base.inverse(inverse.apply(p)),
        }
    }
}

/// Which decorrelation algorithm a colorspace uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecorrelationRoute {
    /// Eigen-based stretch in the colorspace itself.
    Statistical {
        /// Multiplier applied to the user scale
        scale_adjust: f64,
    },
    /// Constant matrix scaled by `scale / 10` in the base space.
    FixedMatrix {
        /// Space the stretch runs in
        base: BaseSpace,
        /// Matrix at scale 10
        matrix: Mat3,
    },
}

/// A named, reversible colorspace.
///
/// ```rust
/// use dstretch_color::{ColorspaceDescriptor, DecorrelationRoute};
/// use dstretch_core::RgbImage;
///
/// let yxx = ColorspaceDescriptor::user_yuv("YXX", None).unwrap();
/// let img = RgbImage::filled(2, 2, [10, 200, 90]);
///
/// let back = yxx.from_space(&yxx.to_space(&img));
/// assert_eq!(back, img);
/// assert!(matches!(yxx.route(), DecorrelationRoute::Statistical { .. }));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColorspaceDescriptor {
    name: String,
    description: String,
    optimized_for: Vec<String>,
    kind: ColorspaceKind,
}

impl ColorspaceDescriptor {
    /// Creates a descriptor.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        optimized_for: &[&str],
        kind: ColorspaceKind,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            optimized_for: optimized_for.iter().map(|s| s.to_string()).collect(),
            kind,
        }
    }

    /// User-configurable YUV-family space. `None` uses the YDS matrix.
    ///
    /// # Errors
    ///
    /// [`ColorError::SingularMatrix`] if the matrix cannot be inverted.
    pub fn user_yuv(name: impl Into<String>, matrix: Option<Mat3>) -> ColorResult<Self> {
        let name = name.into();
        let forward = matrix.unwrap_or(crate::builtin::YDS_MATRIX);
        let kind = ColorspaceKind::yuv(forward)
            .ok_or_else(|| ColorError::SingularMatrix { name: name.clone() })?;
        Ok(Self::new(name, "User-configurable", &["custom"], kind))
    }

    /// User-configurable LAB-family space. `None` uses the LDS matrix.
    ///
    /// # Errors
    ///
    /// [`ColorError::SingularMatrix`] if the matrix cannot be inverted.
    pub fn user_lab(name: impl Into<String>, matrix: Option<Mat3>) -> ColorResult<Self> {
        let name = name.into();
        let forward = matrix.unwrap_or(crate::builtin::LDS_MATRIX);
        let kind = ColorspaceKind::lab_matrix(forward)
            .ok_or_else(|| ColorError::SingularMatrix { name: name.clone() })?;
        Ok(Self::new(name, "User-configurable", &["custom"], kind))
    }

    /// Fixed-matrix space over `base`.
    ///
    /// # Errors
    ///
    /// [`ColorError::SingularMatrix`] if the matrix cannot be inverted.
    pub fn builtin_matrix(
        name: impl Into<String>,
        description: impl Into<String>,
        optimized_for: &[&str],
        base: BaseSpace,
        matrix: Mat3,
    ) -> ColorResult<Self> {
        let name = name.into();
        let kind = ColorspaceKind::builtin_matrix(base, matrix)
            .ok_or_else(|| ColorError::SingularMatrix { name: name.clone() })?;
        Ok(Self::new(name, description, optimized_for, kind))
    }

    /// Colorspace identifier.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Pigment types this space is tuned for.
    #[inline]
    pub fn optimized_for(&self) -> &[String] {
        &self.optimized_for
    }

    /// Conversion kind.
    #[inline]
    pub fn kind(&self) -> &ColorspaceKind {
        &self.kind
    }

    /// Returns true if this space is tuned for `pigment` (case-insensitive).
    pub fn is_optimized_for(&self, pigment: &str) -> bool {
        self.optimized_for
            .iter()
            .any(|p| p.eq_ignore_ascii_case(pigment))
    }

    /// Converts an RGB image into this space.
    pub fn to_space(&self, image: &RgbImage) -> FloatImage {
        let kind = self.kind;
        image.to_float(move |p| kind.forward(p))
    }

    /// Converts a raster in this space back to RGB, clamping to `[0, 255]`.
    pub fn from_space(&self, image: &FloatImage) -> RgbImage {
        let kind = self.kind;
        image.to_rgb(move |p| kind.inverse(p))
    }

    /// Decorrelation route for this space.
    pub fn route(&self) -> DecorrelationRoute {
        match self.kind {
            ColorspaceKind::Rgb => DecorrelationRoute::Statistical {
                scale_adjust: RGB_SCALE_ADJUST,
            },
            ColorspaceKind::Yuv { .. } => DecorrelationRoute::Statistical {
                scale_adjust: YUV_SCALE_ADJUST,
            },
            ColorspaceKind::Lab | ColorspaceKind::LabMatrix { .. } => {
                DecorrelationRoute::Statistical {
                    scale_adjust: LAB_SCALE_ADJUST,
                }
            }
            ColorspaceKind::BuiltinMatrix { base, matrix, .. } => {
                DecorrelationRoute::FixedMatrix { base, matrix }
            }
        }
    }
}
