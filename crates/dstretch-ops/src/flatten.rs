//! Illumination flattening.
//!
//! Removes large-scale brightness variation (uneven lighting, vignetting)
//! while keeping small-scale detail. Each channel is processed as an `f64`
//! plane:
//!
//! | Method | Background |
//! |--------|------------|
//! | `BandpassFilter` | FFT band-pass between `filter_small` and `filter_large`; background is what the filter removed |
//! | `GaussianBackground` | Gaussian blur with `sigma = filter_large` |
//! | `RollingBall` | rolling-ball opening, radius `filter_large` |
//! | `SlidingParaboloid` | sliding-paraboloid opening, radius `filter_large` |
//!
//! Estimated backgrounds are removed by subtraction (re-adding the background
//! mean) or by division (rescaling by the background mean). Uniformity is
//! measured as the coefficient of variation of block means, per channel.

use crate::error::check_range;
use crate::fft::bandpass;
use crate::filter::{block_means, gaussian_blur, mean_std, merge_planes, split_planes};
use crate::morphology::{rolling_ball, sliding_paraboloid};
use crate::{OpsError, OpsResult};
use dstretch_core::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// CV above which flattening is recommended.
pub const CORRECTION_THRESHOLD: f64 = 0.1;

/// Background estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlattenMethod {
    /// FFT band-pass.
    #[default]
    BandpassFilter,
    /// Large Gaussian blur.
    GaussianBackground,
    /// Rolling ball.
    RollingBall,
    /// Sliding paraboloid.
    SlidingParaboloid,
}

impl FlattenMethod {
    /// Snake-case name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BandpassFilter => "bandpass_filter",
            Self::GaussianBackground => "gaussian_background",
            Self::RollingBall => "rolling_ball",
            Self::SlidingParaboloid => "sliding_paraboloid",
        }
    }
}

impl fmt::Display for FlattenMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an estimated background is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundCorrection {
    /// `v - bg + mean(bg)`
    #[default]
    Subtract,
    /// `v / bg * mean(bg)`
    Divide,
}

/// Flatten options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenParams {
    /// Background estimator
    pub method: FlattenMethod,
    /// Structure size in pixels above which variation is removed, `1..=1000`
    pub filter_large: f64,
    /// Structure size below which the band-pass also smooths, `0..filter_large`
    pub filter_small: f64,
    /// Also remove horizontal stripes (row-mean variation)
    pub suppress_stripes: bool,
    /// Stretch the result to the full range
    pub auto_scale: bool,
    /// Background removal for the estimator methods
    pub correction: BackgroundCorrection,
}

impl Default for FlattenParams {
    fn default() -> Self {
        Self {
            method: FlattenMethod::BandpassFilter,
            filter_large: 40.0,
            filter_small: 3.0,
            suppress_stripes: true,
            auto_scale: true,
            correction: BackgroundCorrection::Subtract,
        }
    }
}

impl FlattenParams {
    /// Defaults with another method.
    pub fn with_method(method: FlattenMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    /// Checks ranges.
    pub fn validate(&self) -> OpsResult<()> {
        check_range("filter_large", self.filter_large, 1.0, 1000.0)?;
        check_range("filter_small", self.filter_small, 0.0, 1000.0)?;
        if self.method == FlattenMethod::BandpassFilter && self.filter_small >= self.filter_large {
            return Err(OpsError::invalid_parameter(format!(
                "filter_small ({}) must be below filter_large ({})",
                self.filter_small, self.filter_large
            )));
        }
        Ok(())
    }
}

/// Flatten diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlattenStats {
    /// Method used
    pub method: FlattenMethod,
    /// Channel means before
    pub original_means: [f64; 3],
    /// Channel means after
    pub flattened_means: [f64; 3],
    /// Block-mean CV per channel before
    pub uniformity_before: [f64; 3],
    /// Block-mean CV per channel after
    pub uniformity_after: [f64; 3],
    /// Relative CV reduction per channel; 0 for an already uniform channel
    pub uniformity_improvement: [f64; 3],
    /// Estimated background, quantized
    #[serde(skip)]
    pub background: RgbImage,
}

impl FlattenStats {
    /// Mean of the per-channel improvements.
    pub fn overall_improvement(&self) -> f64 {
        self.uniformity_improvement.iter().sum::<f64>() / 3.0
    }
}

/// Block edge used for uniformity: an eighth of the short side, at least 4.
fn uniformity_block(width: usize, height: usize) -> usize {
    (width.min(height) / 8).max(4)
}

/// Coefficient of variation of block means; 0 when the mean is 0.
fn block_cv(plane: &[f64], width: usize, height: usize) -> f64 {
    let means = block_means(plane, width, height, uniformity_block(width, height));
    let (mean, std) = mean_std(&means);
    if mean.abs() > 1e-12 { std / mean } else { 0.0 }
}

/// Sets every row mean to the plane mean.
fn remove_row_stripes(plane: &mut [f64], width: usize) {
    let (mean, _) = mean_std(plane);
    for row in plane.chunks_mut(width) {
        let (row_mean, _) = mean_std(row);
        let shift = mean - row_mean;
        row.iter_mut().for_each(|v| *v += shift);
    }
}

fn remove_background(
    plane: &[f64],
    background: &[f64],
    correction: BackgroundCorrection,
) -> Vec<f64> {
    let (bg_mean, _) = mean_std(background);
    match correction {
        BackgroundCorrection::Subtract => plane
            .iter()
            .zip(background)
            .map(|(v, b)| v - b + bg_mean)
            .collect(),
        BackgroundCorrection::Divide => plane
            .iter()
            .zip(background)
            .map(|(v, b)| v / b.max(1.0) * bg_mean)
            .collect(),
    }
}

/// Flattens one plane, returning `(flattened, background)`.
fn flatten_plane(
    plane: &[f64],
    width: usize,
    height: usize,
    params: &FlattenParams,
) -> OpsResult<(Vec<f64>, Vec<f64>)> {
    if params.method == FlattenMethod::BandpassFilter {
        let out = bandpass(
            plane,
            width,
            height,
            params.filter_large,
            params.filter_small,
            params.suppress_stripes,
        )?;
        let (mean, _) = mean_std(&out);
        let background = plane.iter().zip(&out).map(|(v, o)| v - o + mean).collect();
        return Ok((out, background));
    }

    let background = match params.method {
        FlattenMethod::GaussianBackground => {
            gaussian_blur(plane, width, height, params.filter_large)?
        }
        FlattenMethod::RollingBall => rolling_ball(plane, width, height, params.filter_large)?,
        _ => sliding_paraboloid(plane, width, height, params.filter_large)?,
    };
    let mut out = remove_background(plane, &background, params.correction);
    if params.suppress_stripes {
        remove_row_stripes(&mut out, width);
    }
    Ok((out, background))
}

/// Per-channel min/max stretch to `0..=255`; flat channels are left alone.
fn auto_scale(planes: &mut [Vec<f64>; 3]) {
    for plane in planes.iter_mut() {
        let (min, max) = plane
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
        if !(max - min > 1e-6) {
            continue;
        }
        let k = 255.0 / (max - min);
        plane.iter_mut().for_each(|v| *v = (*v - min) * k);
    }
}

/// Removes uneven illumination.
///
/// # Errors
///
/// Fails on an invalid image or out-of-range options.
pub fn flatten(image: &RgbImage, params: &FlattenParams) -> OpsResult<(RgbImage, FlattenStats)> {
    image.ensure_valid()?;
    params.validate()?;
    debug!(
        method = %params.method,
        filter_large = params.filter_large,
        filter_small = params.filter_small,
        suppress_stripes = params.suppress_stripes,
        auto_scale = params.auto_scale,
        "flatten"
    );

    let (w, h) = (image.width() as usize, image.height() as usize);
    let planes = split_planes(image);
    let uniformity_before = [0usize, 1, 2].map(|c| block_cv(&planes[c], w, h));

    let mut flat: [Vec<f64>; 3] = Default::default();
    let mut background: [Vec<f64>; 3] = Default::default();
    for c in 0..3 {
        let (f, b) = flatten_plane(&planes[c], w, h, params)?;
        flat[c] = f;
        background[c] = b;
    }
    if params.auto_scale {
        auto_scale(&mut flat);
    }

    let out = merge_planes(image.width(), image.height(), &flat)?;
    let background = merge_planes(image.width(), image.height(), &background)?;

    let after_planes = split_planes(&out);
    let uniformity_after = [0usize, 1, 2].map(|c| block_cv(&after_planes[c], w, h));
    let uniformity_improvement = [0usize, 1, 2].map(|c| {
        if uniformity_before[c] > 1e-12 {
            (uniformity_before[c] - uniformity_after[c]) / uniformity_before[c]
        } else {
            0.0
        }
    });
    trace!(?uniformity_before, ?uniformity_after, "uniformity");

    let stats = FlattenStats {
        method: params.method,
        original_means: image.channel_means(),
        flattened_means: out.channel_means(),
        uniformity_before,
        uniformity_after,
        uniformity_improvement,
        background,
    };
    Ok((out, stats))
}

/// Illumination summary of an image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IlluminationAnalysis {
    /// Block-mean CV per channel
    pub channel_cv: [f64; 3],
    /// `1 - mean CV`, clamped to `0..=1`
    pub overall_uniformity: f64,
    /// Mean CV above [`CORRECTION_THRESHOLD`]
    pub needs_correction: bool,
    /// Suggested estimator
    pub recommended_method: FlattenMethod,
    /// Suggested structure size
    pub recommended_large_filter: f64,
}

/// Measures illumination uniformity and suggests flatten settings.
///
/// Strong gradients (mean CV above 0.25) get `GaussianBackground`, milder
/// ones `BandpassFilter`. The structure size is an eighth of the short side,
/// clamped to `10..=200`.
///
/// ```rust
/// use dstretch_core::RgbImage;
/// use dstretch_ops::flatten::analyze_illumination;
///
/// let even = RgbImage::filled(64, 64, [120, 110, 100]);
/// let a = analyze_illumination(&even).unwrap();
/// assert!(!a.needs_correction);
/// assert_eq!(a.overall_uniformity, 1.0);
/// ```
pub fn analyze_illumination(image: &RgbImage) -> OpsResult<IlluminationAnalysis> {
    image.ensure_valid()?;
    let (w, h) = (image.width() as usize, image.height() as usize);
    let planes = split_planes(image);
    let channel_cv = [0usize, 1, 2].map(|c| block_cv(&planes[c], w, h));
    let mean_cv = channel_cv.iter().sum::<f64>() / 3.0;
    let recommended_method = if mean_cv > 0.25 {
        FlattenMethod::GaussianBackground
    } else {
        FlattenMethod::BandpassFilter
    };
    Ok(IlluminationAnalysis {
        channel_cv,
        overall_uniformity: (1.0 - mean_cv).clamp(0.0, 1.0),
        needs_correction: mean_cv > CORRECTION_THRESHOLD,
        recommended_method,
        recommended_large_filter: ((w.min(h) / 8) as f64).clamp(10.0, 200.0),
    })
}
