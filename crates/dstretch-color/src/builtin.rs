//! Built-in colorspace catalog.
//!
//! Nineteen spaces in four groups:
//!
//! | Group | Names |
//! |-------|-------|
//! | Base | RGB, LAB |
//! | YUV family | YDS YBR YBK YRE YRD YYE YWE YXX |
//! | LAB family | LDS LRE LRD LBK LBL LWE LYE LXX |
//! | Fixed matrix | CRGB |
//!
//! Every YUV matrix shares the Rec.601 luma row; the other two rows bias
//! chroma sensitivity toward particular pigments.

use crate::space::{BaseSpace, ColorspaceDescriptor, ColorspaceKind};
use dstretch_core::REC601_LUMA;
use dstretch_math::Mat3;

const fn yuv(u: [f64; 3], v: [f64; 3]) -> Mat3 {
    Mat3::from_rows([REC601_LUMA, u, v])
}

/// YDS: general purpose, default for YXX.
pub const YDS_MATRIX: Mat3 = yuv([-0.169, -0.331, 0.500], [0.500, -0.419, -0.081]);
/// YBR: reds.
pub const YBR_MATRIX: Mat3 = yuv([-0.100, -0.200, 0.300], [0.700, -0.587, -0.113]);
/// YBK: blacks and blues.
pub const YBK_MATRIX: Mat3 = yuv([-0.200, -0.400, 0.600], [0.400, -0.300, -0.100]);
/// YRE: red enhancement.
pub const YRE_MATRIX: Mat3 = yuv([-0.080, -0.160, 0.240], [0.800, -0.600, -0.200]);
/// YRD: red variant.
pub const YRD_MATRIX: Mat3 = yuv([-0.120, -0.240, 0.360], [0.600, -0.500, -0.100]);
/// YYE: yellow enhancement.
pub const YYE_MATRIX: Mat3 = yuv([-0.050, -0.100, 0.150], [0.500, -0.400, -0.100]);
/// YWE: white enhancement.
pub const YWE_MATRIX: Mat3 = yuv([-0.030, -0.060, 0.090], [0.300, -0.250, -0.050]);

/// LDS: general, default for LXX.
pub const LDS_MATRIX: Mat3 = Mat3::from_rows([[1.0, 0.0, 0.0], [0.0, 1.2, -0.2], [0.0, -0.3, 1.3]]);
/// LRE: reds, natural colors.
pub const LRE_MATRIX: Mat3 = Mat3::diagonal(1.0, 1.5, 0.8);
/// LRD: red variant.
pub const LRD_MATRIX: Mat3 = Mat3::diagonal(1.0, 1.3, 0.9);
/// LBK: blacks.
pub const LBK_MATRIX: Mat3 = Mat3::diagonal(1.2, 0.8, 0.8);
/// LBL: blues.
pub const LBL_MATRIX: Mat3 = Mat3::diagonal(1.0, 0.7, 1.4);
/// LWE: whites.
pub const LWE_MATRIX: Mat3 = Mat3::diagonal(1.3, 0.9, 0.9);
/// LYE: yellows.
pub const LYE_MATRIX: Mat3 = Mat3::diagonal(1.0, 0.9, 1.5);

/// CRGB: constant stretch matrix for faint reds.
pub const CRGB_MATRIX: Mat3 = Mat3::from_rows([[1.2, -0.6, 0.4], [-0.3, 1.1, 0.2], [0.1, -0.5, 1.4]]);

const YUV_SPACES: &[(&str, &str, &[&str], Mat3)] = &[
    ("YDS", "General purpose, excellent for yellows", &["yellow", "general"], YDS_MATRIX),
    ("YBR", "Optimized for reds", &["red"], YBR_MATRIX),
    ("YBK", "Specialized for blacks and blues", &["black", "blue"], YBK_MATRIX),
    ("YRE", "Red enhancement", &["red"], YRE_MATRIX),
    ("YRD", "Red variant", &["red"], YRD_MATRIX),
    ("YYE", "Yellow enhancement", &["yellow"], YYE_MATRIX),
    ("YWE", "White enhancement", &["white"], YWE_MATRIX),
    ("YXX", "User-configurable", &["custom"], YDS_MATRIX),
];

const LAB_SPACES: &[(&str, &str, &[&str], Mat3)] = &[
    ("LDS", "General, better than YDS for yellows", &["yellow", "general"], LDS_MATRIX),
    ("LRE", "Excellent for reds, natural colors", &["red", "natural_colors"], LRE_MATRIX),
    ("LRD", "Red variant", &["red"], LRD_MATRIX),
    ("LBK", "Black enhancement", &["black"], LBK_MATRIX),
    ("LBL", "Blue enhancement", &["blue"], LBL_MATRIX),
    ("LWE", "White enhancement", &["white"], LWE_MATRIX),
    ("LYE", "Yellow enhancement", &["yellow"], LYE_MATRIX),
    ("LXX", "User-configurable", &["custom"], LDS_MATRIX),
];

/// Builds every built-in descriptor.
///
/// Catalog matrices are all invertible; an entry whose matrix were not
/// would be skipped rather than registered half-formed.
pub fn builtin_colorspaces() -> Vec<ColorspaceDescriptor> {
    let mut spaces = vec![
        ColorspaceDescriptor::new("RGB", "Standard RGB color space", &["general"], ColorspaceKind::Rgb),
        ColorspaceDescriptor::new(
            "LAB",
            "CIE LAB color space - perceptually uniform",
            &["general", "natural_colors"],
            ColorspaceKind::Lab,
        ),
    ];

    for (name, description, pigments, matrix) in YUV_SPACES {
        if let Some(kind) = ColorspaceKind::yuv(*matrix) {
            spaces.push(ColorspaceDescriptor::new(*name, *description, pigments, kind));
        }
    }
    for (name, description, pigments, matrix) in LAB_SPACES {
        if let Some(kind) = ColorspaceKind::lab_matrix(*matrix) {
            spaces.push(ColorspaceDescriptor::new(*name, *description, pigments, kind));
        }
    }
    if let Some(kind) = ColorspaceKind::builtin_matrix(BaseSpace::Rgb, CRGB_MATRIX) {
        spaces.push(ColorspaceDescriptor::new(
            "CRGB",
            "Pre-calculated matrix, very effective for faint reds",
            &["red", "faint_pigments"],
            kind,
        ));
    }
    spaces
}
