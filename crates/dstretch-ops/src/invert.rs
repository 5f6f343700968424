//! Color inversion.
//!
//! | Mode | Effect |
//! |------|--------|
//! | `Full` | every channel `255 - c` |
//! | `LuminanceOnly` | luma `Y' = 255 - Y`, chroma kept: `c + (255 - 2Y)` |
//! | `Selective` | `255 - c` for the listed channel indices only |
//!
//! `Full` and `Selective` are exact involutions.

use crate::{OpsError, OpsResult};
use dstretch_core::{luma601, quantize, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which part of the color to invert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvertMode {
    /// All three channels.
    #[default]
    Full,
    /// Rec.601 luma only; chroma offsets are preserved.
    LuminanceOnly,
    /// The channels listed in [`InvertParams::channels`].
    Selective,
}

/// Invert options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvertParams {
    /// Inversion mode
    pub mode: InvertMode,
    /// Channel indices (0 = R, 1 = G, 2 = B) for `Selective`
    pub channels: Vec<usize>,
}

impl Default for InvertParams {
    fn default() -> Self {
        Self {
            mode: InvertMode::Full,
            channels: vec![0, 1, 2],
        }
    }
}

impl InvertParams {
    /// Selective inversion of `channels`.
    pub fn selective(channels: &[usize]) -> Self {
        Self {
            mode: InvertMode::Selective,
            channels: channels.to_vec(),
        }
    }

    /// Checks the channel list for `Selective` mode.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidParameter`] for an empty list or an index above 2.
    pub fn validate(&self) -> OpsResult<()> {
        if self.mode == InvertMode::Selective {
            if self.channels.is_empty() {
                return Err(OpsError::invalid_parameter(
                    "selective inversion needs at least one channel",
                ));
            }
            if let Some(c) = self.channels.iter().find(|c| **c > 2) {
                return Err(OpsError::invalid_parameter(format!(
                    "channel index {} out of range 0..=2",
                    c
                )));
            }
        }
        Ok(())
    }
}

/// Invert diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvertStats {
    /// Mode used
    pub mode: InvertMode,
    /// Mean absolute per-sample change on the 0..255 scale
    pub mean_change: f64,
    /// Channel means before
    pub original_means: [f64; 3],
    /// Channel means after
    pub inverted_means: [f64; 3],
}

/// Inverts an image.
///
/// ```rust
/// use dstretch_core::RgbImage;
/// use dstretch_ops::invert::{invert, InvertParams};
///
/// let img = RgbImage::filled(2, 2, [0, 100, 255]);
/// let (out, stats) = invert(&img, &InvertParams::default()).unwrap();
/// assert_eq!(out.pixel(0, 0), [255, 155, 0]);
/// assert!((stats.mean_change - (255.0 + 55.0 + 255.0) / 3.0).abs() < 1e-9);
/// ```
///
/// # Errors
///
/// Fails on an invalid image or channel list.
pub fn invert(image: &RgbImage, params: &InvertParams) -> OpsResult<(RgbImage, InvertStats)> {
    image.ensure_valid()?;
    params.validate()?;
    debug!(mode = ?params.mode, channels = ?params.channels, "invert");

    let out = match params.mode {
        InvertMode::Full => image.map_pixels(|[r, g, b]| [255 - r, 255 - g, 255 - b]),
        InvertMode::LuminanceOnly => image.map_pixels(|p| {
            let y = luma601([p[0] as f64, p[1] as f64, p[2] as f64]);
            let shift = 255.0 - 2.0 * y;
            p.map(|c| quantize(c as f64 + shift))
        }),
        InvertMode::Selective => {
            let mut flip = [false; 3];
            for &c in &params.channels {
                flip[c] = true;
            }
            image.map_pixels(move |p| {
                [
                    if flip[0] { 255 - p[0] } else { p[0] },
                    if flip[1] { 255 - p[1] } else { p[1] },
                    if flip[2] { 255 - p[2] } else { p[2] },
                ]
            })
        }
    };

    let total: u64 = image
        .data()
        .iter()
        .zip(out.data())
        .map(|(a, b)| (*a as i32 - *b as i32).unsigned_abs() as u64)
        .sum();
    let stats = InvertStats {
        mode: params.mode,
        mean_change: total as f64 / image.data().len() as f64,
        original_means: image.channel_means(),
        inverted_means: out.channel_means(),
    };
    Ok((out, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dstretch_core::ErrorKind;

    fn sample() -> RgbImage {
        RgbImage::from_fn(17, 9, |x, y| [(x * 15) as u8, (y * 28) as u8, ((x + y) * 9) as u8])
    }

    #[test]
    fn test_full_is_involution() {
        let img = sample();
        let p = InvertParams::default();
        let (once, _) = invert(&img, &p).unwrap();
        let (twice, _) = invert(&once, &p).unwrap();
        assert_eq!(twice, img);
    }

    #[test]
    fn test_selective_only_touches_listed() {
        let img = RgbImage::filled(3, 3, [10, 20, 30]);
        let (out, _) = invert(&img, &InvertParams::selective(&[1])).unwrap();
        assert_eq!(out.pixel(1, 1), [10, 235, 30]);
    }

    #[test]
    fn test_selective_validation() {
        let img = sample();
        let err = invert(&img, &InvertParams::selective(&[])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        let err = invert(&img, &InvertParams::selective(&[0, 3])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_luminance_only_on_gray() {
        let img = RgbImage::filled(2, 2, [40, 40, 40]);
        let params = InvertParams {
            mode: InvertMode::LuminanceOnly,
            ..Default::default()
        };
        let (out, _) = invert(&img, &params).unwrap();
        assert_eq!(out.pixel(0, 0), [215, 215, 215]);
    }

    #[test]
    fn test_luminance_only_keeps_chroma_offsets() {
        let img = RgbImage::filled(1, 1, [120, 100, 80]);
        let params = InvertParams {
            mode: InvertMode::LuminanceOnly,
            ..Default::default()
        };
        let (out, _) = invert(&img, &params).unwrap();
        let p = out.pixel(0, 0);
        assert_eq!(p[0] as i32 - p[1] as i32, 20);
        assert_eq!(p[1] as i32 - p[2] as i32, 20);
    }

    #[test]
    fn test_rejects_empty_image() {
        let err = invert(&RgbImage::new(0, 5), &InvertParams::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidImage);
    }
}
