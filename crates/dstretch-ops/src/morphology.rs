//! Morphological background estimation.
//!
//! Both estimators treat a plane as an intensity surface and take the
//! grayscale *opening* with a curved structuring element, which follows the
//! slowly varying background while cutting off features narrower than the
//! element.
//!
//! - [`rolling_ball`] - spherical cap of the given radius. Large radii run on
//!   a block-minimum shrunk copy and are bilinearly expanded back; the ball
//!   on the shrunk copy never exceeds [`MAX_SHRUNK_RADIUS`].
//! - [`sliding_paraboloid`] - paraboloid `z = (dx^2 + dy^2) / (2r)`; separable,
//!   so it runs as two 1D lower-envelope passes in linear time per row.

use crate::filter::{check_plane, transpose};
use crate::OpsResult;
use rayon::prelude::*;
use tracing::trace;

/// Largest ball radius used on the shrunk copy.
pub const MAX_SHRUNK_RADIUS: f64 = 25.0;

/// Shrink factor for a ball radius.
fn shrink_factor(radius: f64) -> usize {
    if radius <= 10.0 {
        1
    } else if radius <= 30.0 {
        2
    } else if radius <= 100.0 {
        4
    } else {
        ((radius / MAX_SHRUNK_RADIUS).ceil() as usize).max(8)
    }
}

/// Rolling-ball background of one plane.
///
/// ```rust
/// use dstretch_ops::morphology::rolling_ball;
///
/// let flat = vec![60.0; 24 * 24];
/// let bg = rolling_ball(&flat, 24, 24, 8.0).unwrap();
/// assert!(bg.iter().all(|v| (v - 60.0).abs() < 1e-9));
/// ```
pub fn rolling_ball(src: &[f64], width: usize, height: usize, radius: f64) -> OpsResult<Vec<f64>> {
    check_plane(src, width, height)?;
    if src.is_empty() || radius <= 0.0 {
        return Ok(src.to_vec());
    }
    let shrink = shrink_factor(radius);
    trace!(width, height, radius, shrink, "rolling_ball");

    let (small, sw, sh) = shrink_min(src, width, height, shrink);
    let r = (radius / shrink as f64).max(1.0);
    let ball = ball_offsets(r);
    let eroded = ball_pass(&small, sw, sh, &ball, true);
    let opened = ball_pass(&eroded, sw, sh, &ball, false);

    if shrink == 1 {
        return Ok(opened);
    }
    Ok(expand_bilinear(&opened, sw, sh, width, height, shrink))
}

/// Sliding-paraboloid background of one plane.
///
/// ```rust
/// use dstretch_ops::morphology::sliding_paraboloid;
///
/// // narrow spike on a flat floor is removed
/// let mut src = vec![10.0; 21 * 21];
/// src[10 * 21 + 10] = 200.0;
/// let bg = sliding_paraboloid(&src, 21, 21, 5.0).unwrap();
/// assert!(bg[10 * 21 + 10] < 11.0);
/// ```
pub fn sliding_paraboloid(
    src: &[f64],
    width: usize,
    height: usize,
    radius: f64,
) -> OpsResult<Vec<f64>> {
    check_plane(src, width, height)?;
    if src.is_empty() || radius <= 0.0 {
        return Ok(src.to_vec());
    }
    trace!(width, height, radius, "sliding_paraboloid");
    let c = 1.0 / (2.0 * radius);

    let eroded = separable(src, width, height, |line, out| parabolic_erode(line, c, out));
    // dilation is erosion of the negated surface
    let neg: Vec<f64> = eroded.iter().map(|v| -v).collect();
    let dilated = separable(&neg, width, height, |line, out| parabolic_erode(line, c, out));
    Ok(dilated.into_iter().map(|v| -v).collect())
}

fn separable<F>(src: &[f64], width: usize, height: usize, pass: F) -> Vec<f64>
where
    F: Fn(&[f64], &mut [f64]) + Sync,
{
    let mut rows = vec![0.0; src.len()];
    rows.par_chunks_mut(width)
        .zip(src.par_chunks(width))
        .for_each(|(out, line)| pass(line, out));
    let t = transpose(&rows, width, height);
    let mut cols = vec![0.0; t.len()];
    cols.par_chunks_mut(height)
        .zip(t.par_chunks(height))
        .for_each(|(out, line)| pass(line, out));
    transpose(&cols, height, width)
}

/// `out[p] = min_q f[q] + c (p - q)^2`, lower envelope of parabolas.
fn parabolic_erode(f: &[f64], c: f64, out: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];
    let mut k = 0usize;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    let intersect = |q: usize, p: usize| -> f64 {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + c * qf * qf) - (f[p] + c * pf * pf)) / (2.0 * c * (qf - pf))
    };

    for q in 1..n {
        let mut s = intersect(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (p, o) in out.iter_mut().enumerate() {
        while z[k + 1] < p as f64 {
            k += 1;
        }
        let d = p as f64 - v[k] as f64;
        *o = f[v[k]] + c * d * d;
    }
}

/// Offsets `(dx, dy, height)` of a ball cap of radius `r`.
fn ball_offsets(r: f64) -> Vec<(isize, isize, f64)> {
    let ri = r.floor() as isize;
    let mut offsets = Vec::new();
    for dy in -ri..=ri {
        for dx in -ri..=ri {
            let d2 = (dx * dx + dy * dy) as f64;
            if d2 <= r * r {
                offsets.push((dx, dy, (r * r - d2).sqrt() - r));
            }
        }
    }
    offsets
}

/// Erosion (`min f(x+d) - z(d)`) or dilation (`max f(x-d) + z(d)`) with a ball.
///
/// Heights are non-positive with 0 at the center, so a flat plane is a
/// fixed point of both passes.
fn ball_pass(
    src: &[f64],
    width: usize,
    height: usize,
    ball: &[(isize, isize, f64)],
    erode: bool,
) -> Vec<f64> {
    let mut dst = vec![0.0; src.len()];
    dst.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, out) in row.iter_mut().enumerate() {
            let mut acc = if erode { f64::INFINITY } else { f64::NEG_INFINITY };
            for &(dx, dy, z) in ball {
                let sx = x as isize + dx;
                let sy = y as isize + dy;
                if sx < 0 || sy < 0 || sx >= width as isize || sy >= height as isize {
                    continue;
                }
                let v = src[sy as usize * width + sx as usize];
                if erode {
                    acc = acc.min(v - z);
                } else {
                    acc = acc.max(v + z);
                }
            }
            *out = acc;
        }
    });
    dst
}

fn shrink_min(src: &[f64], width: usize, height: usize, shrink: usize) -> (Vec<f64>, usize, usize) {
    if shrink == 1 {
        return (src.to_vec(), width, height);
    }
    let sw = width.div_ceil(shrink);
    let sh = height.div_ceil(shrink);
    let mut dst = vec![0.0; sw * sh];
    dst.par_chunks_mut(sw).enumerate().for_each(|(sy, row)| {
        for (sx, out) in row.iter_mut().enumerate() {
            let mut m = f64::INFINITY;
            for y in sy * shrink..((sy + 1) * shrink).min(height) {
                for x in sx * shrink..((sx + 1) * shrink).min(width) {
                    m = m.min(src[y * width + x]);
                }
            }
            *out = m;
        }
    });
    (dst, sw, sh)
}

fn expand_bilinear(
    small: &[f64],
    sw: usize,
    sh: usize,
    width: usize,
    height: usize,
    shrink: usize,
) -> Vec<f64> {
    let mut dst = vec![0.0; width * height];
    let s = shrink as f64;
    dst.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        // sample at the center of each shrunk block
        let fy = ((y as f64 + 0.5) / s - 0.5).clamp(0.0, (sh - 1) as f64);
        let y0 = fy.floor() as usize;
        let y1 = (y0 + 1).min(sh - 1);
        let ty = fy - y0 as f64;
        for (x, out) in row.iter_mut().enumerate() {
            let fx = ((x as f64 + 0.5) / s - 0.5).clamp(0.0, (sw - 1) as f64);
            let x0 = fx.floor() as usize;
            let x1 = (x0 + 1).min(sw - 1);
            let tx = fx - x0 as f64;
            let top = small[y0 * sw + x0] * (1.0 - tx) + small[y0 * sw + x1] * tx;
            let bottom = small[y1 * sw + x0] * (1.0 - tx) + small[y1 * sw + x1] * tx;
            *out = top * (1.0 - ty) + bottom * ty;
        }
    });
    dst
}
