//! Percentile histogram stretch.
//!
//! For each channel the `clip_percentage`-th and `(100 - clip_percentage)`-th
//! percentiles are located on a 256-bin histogram and linearly remapped to
//! `0..=255`; values outside the range clamp. With `preserve_colors` one
//! joint histogram over all three channels yields a single range, so hue
//! ratios between channels survive the stretch.
//!
//! A channel whose low and high percentiles coincide is left untouched.

use crate::error::check_range;
use crate::filter::mean_std;
use crate::OpsResult;
use dstretch_core::{quantize, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Auto-contrast options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoContrastParams {
    /// Percent of samples clipped at each end, `0..=5`
    pub clip_percentage: f64,
    /// Stretch all channels with one joint range
    pub preserve_colors: bool,
}

impl Default for AutoContrastParams {
    fn default() -> Self {
        Self {
            clip_percentage: 0.35,
            preserve_colors: true,
        }
    }
}

impl AutoContrastParams {
    /// Checks the clip percentage.
    pub fn validate(&self) -> OpsResult<()> {
        check_range("clip_percentage", self.clip_percentage, 0.0, 5.0)
    }
}

/// Auto-contrast diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoContrastStats {
    /// Low percentile per channel before the stretch
    pub low: [u8; 3],
    /// High percentile per channel before the stretch
    pub high: [u8; 3],
    /// Channels that were skipped because `low == high`
    pub skipped: [bool; 3],
    /// Ratio of the mean percentile range after to before; `1.0` when flat
    pub contrast_improvement: f64,
}

/// 256-bin histogram.
pub type Histogram = [u64; 256];

/// Histogram of one channel, or of all three when `channel` is `None`.
pub fn histogram(image: &RgbImage, channel: Option<usize>) -> Histogram {
    let mut hist = [0u64; 256];
    match channel {
        Some(c) => image.data().iter().skip(c).step_by(3).for_each(|v| hist[*v as usize] += 1),
        None => image.data().iter().for_each(|v| hist[*v as usize] += 1),
    }
    hist
}

/// `(low, high)` percentiles of a histogram.
///
/// `low` is the first value whose cumulative count exceeds
/// `floor(total * p / 100)`; `high` is the same from the top.
///
/// ```rust
/// use dstretch_ops::auto_contrast::percentiles;
///
/// let mut hist = [0u64; 256];
/// hist[10] = 50;
/// hist[200] = 50;
/// assert_eq!(percentiles(&hist, 0.0), (10, 200));
/// ```
pub fn percentiles(hist: &Histogram, clip_percentage: f64) -> (u8, u8) {
    let total: u64 = hist.iter().sum();
    if total == 0 {
        return (0, 255);
    }
    let cut = (total as f64 * clip_percentage / 100.0).floor() as u64;

    let mut low = 0u8;
    let mut acc = 0u64;
    for (v, n) in hist.iter().enumerate() {
        acc += n;
        if acc > cut {
            low = v as u8;
            break;
        }
    }
    let mut high = 255u8;
    acc = 0;
    for (v, n) in hist.iter().enumerate().rev() {
        acc += n;
        if acc > cut {
            high = v as u8;
            break;
        }
    }
    (low, high.max(low))
}

fn channel_ranges(image: &RgbImage, params: &AutoContrastParams) -> ([u8; 3], [u8; 3]) {
    let mut low = [0u8; 3];
    let mut high = [255u8; 3];
    if params.preserve_colors {
        let (l, h) = percentiles(&histogram(image, None), params.clip_percentage);
        low = [l; 3];
        high = [h; 3];
    } else {
        for c in 0..3 {
            let (l, h) = percentiles(&histogram(image, Some(c)), params.clip_percentage);
            low[c] = l;
            high[c] = h;
        }
    }
    (low, high)
}

/// Stretches contrast.
///
/// ```rust
/// use dstretch_core::RgbImage;
/// use dstretch_ops::auto_contrast::{auto_contrast, AutoContrastParams};
///
/// let img = RgbImage::from_fn(10, 1, |x, _| [100 + x as u8 * 5; 3]);
/// let params = AutoContrastParams { clip_percentage: 0.0, ..Default::default() };
/// let (out, stats) = auto_contrast(&img, &params).unwrap();
/// assert_eq!(out.pixel(0, 0), [0, 0, 0]);
/// assert_eq!(out.pixel(9, 0), [255, 255, 255]);
/// assert!(stats.contrast_improvement > 5.0);
/// ```
///
/// # Errors
///
/// Fails on an invalid image or a clip percentage outside `0..=5`.
pub fn auto_contrast(
    image: &RgbImage,
    params: &AutoContrastParams,
) -> OpsResult<(RgbImage, AutoContrastStats)> {
    image.ensure_valid()?;
    params.validate()?;
    debug!(
        clip = params.clip_percentage,
        preserve_colors = params.preserve_colors,
        "auto_contrast"
    );

    let (low, high) = channel_ranges(image, params);
    trace!(?low, ?high, "percentiles");
    let skipped = [0, 1, 2].map(|c| low[c] == high[c]);
    if skipped.iter().any(|s| *s) {
        warn!(?skipped, "flat channel, contrast stretch skipped");
    }

    let mut lut = [[0u8; 256]; 3];
    for c in 0..3 {
        for (v, out) in lut[c].iter_mut().enumerate() {
            *out = if skipped[c] {
                v as u8
            } else {
                let (lo, hi) = (low[c] as f64, high[c] as f64);
                quantize((v as f64 - lo) * 255.0 / (hi - lo))
            };
        }
    }
    let out = image.map_pixels(move |p| {
        [
            lut[0][p[0] as usize],
            lut[1][p[1] as usize],
            lut[2][p[2] as usize],
        ]
    });

    let before = mean_range(&low, &high);
    let (after_low, after_high) = channel_ranges(&out, params);
    let after = mean_range(&after_low, &after_high);
    let contrast_improvement = if before > 0.0 { after / before } else { 1.0 };

    Ok((
        out,
        AutoContrastStats {
            low,
            high,
            skipped,
            contrast_improvement,
        },
    ))
}

fn mean_range(low: &[u8; 3], high: &[u8; 3]) -> f64 {
    (0..3).map(|c| (high[c] - low[c]) as f64).sum::<f64>() / 3.0
}

/// Per-channel tonal summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelSummary {
    /// Smallest value
    pub min: u8,
    /// Largest value
    pub max: u8,
    /// Mean value
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
}

/// Contrast analysis of an image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContrastAnalysis {
    /// Summary per channel (R, G, B)
    pub channels: [ChannelSummary; 3],
    /// Mean of `max - min` over the channels
    pub dynamic_range: f64,
    /// True when the range is under 200 or the mean std under 40
    pub needs_enhancement: bool,
}

/// Summarizes the tonal range of an image.
pub fn analyze(image: &RgbImage) -> OpsResult<ContrastAnalysis> {
    image.ensure_valid()?;
    let channels = [0usize, 1, 2].map(|c| {
        let values = image.channel(c);
        let as_f64: Vec<f64> = values.iter().map(|v| *v as f64).collect();
        let (mean, std) = mean_std(&as_f64);
        ChannelSummary {
            min: values.iter().copied().min().unwrap_or(0),
            max: values.iter().copied().max().unwrap_or(0),
            mean,
            std,
        }
    });
    let dynamic_range = channels.iter().map(|s| (s.max - s.min) as f64).sum::<f64>() / 3.0;
    let avg_std = channels.iter().map(|s| s.std).sum::<f64>() / 3.0;
    Ok(ContrastAnalysis {
        channels,
        dynamic_range,
        needs_enhancement: dynamic_range < 200.0 || avg_std < 40.0,
    })
}
