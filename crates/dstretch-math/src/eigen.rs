//! Eigendecomposition of symmetric 3x3 matrices.
//!
//! Uses cyclic Jacobi rotations, which converge for any symmetric input and
//! keep the eigenvectors orthonormal to machine precision. Eigenpairs are
//! sorted by descending eigenvalue; equal eigenvalues keep the order the
//! solver produced them in.
//!
//! # Usage
//!
//! ```rust
//! use dstretch_math::{Mat3, SymmetricEigen, EIGENVALUE_FLOOR};
//!
//! let cov = Mat3::diagonal(1.0, 9.0, 0.0);
//! let eigen = SymmetricEigen::new(&cov).clamp_floor(EIGENVALUE_FLOOR);
//!
//! assert_eq!(eigen.values, [9.0, 1.0, EIGENVALUE_FLOOR]);
//! assert_eq!(eigen.clamped, 1);
//! ```

use crate::{Mat3, Vec3};

/// Smallest eigenvalue admitted downstream of the decomposition.
pub const EIGENVALUE_FLOOR: f64 = 1e-10;

const MAX_SWEEPS: usize = 64;

/// Eigenvalues and unit eigenvectors of a symmetric matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetricEigen {
    /// Eigenvalues, largest first
    pub values: [f64; 3],
    /// Eigenvectors as columns, in the same order as `values`
    pub vectors: Mat3,
    /// How many eigenvalues were raised by [`clamp_floor`](Self::clamp_floor)
    pub clamped: usize,
}

impl SymmetricEigen {
    /// Decomposes a symmetric matrix.
    ///
    /// Only the upper triangle is read. Each eigenvector is sign-normalized
    /// so that its largest-magnitude component is positive.
    pub fn new(matrix: &Mat3) -> Self {
        let mut a = matrix.m;
        a[1][0] = a[0][1];
        a[2][0] = a[0][2];
        a[2][1] = a[1][2];
        let mut v = Mat3::IDENTITY.m;

        for _ in 0..MAX_SWEEPS {
            let off = a[0][1] * a[0][1] + a[0][2] * a[0][2] + a[1][2] * a[1][2];
            let diag = a[0][0] * a[0][0] + a[1][1] * a[1][1] + a[2][2] * a[2][2];
            if off == 0.0 || off <= f64::EPSILON * f64::EPSILON * diag {
                break;
            }
            for (p, q) in [(0, 1), (0, 2), (1, 2)] {
                rotate(&mut a, &mut v, p, q);
            }
        }

        let raw_values = [a[0][0], a[1][1], a[2][2]];
        let mut order = [0usize, 1, 2];
        // sort_by is stable: ties keep ascending solver index
        order.sort_by(|&i, &j| raw_values[j].total_cmp(&raw_values[i]));

        let mut values = [0.0; 3];
        let mut cols = [[0.0; 3]; 3];
        for (k, &i) in order.iter().enumerate() {
            values[k] = raw_values[i];
            let col = Vec3::new(v[0][i], v[1][i], v[2][i]).normalize();
            cols[k] = canonical_sign(col).to_array();
        }

        Self {
            values,
            vectors: Mat3::from_cols(cols),
            clamped: 0,
        }
    }

    /// Raises every eigenvalue below `floor` to `floor`.
    pub fn clamp_floor(mut self, floor: f64) -> Self {
        for v in &mut self.values {
            if *v < floor || v.is_nan() {
                *v = floor;
                self.clamped += 1;
            }
        }
        self
    }

    /// Builds `V * diag(f(lambda_i)) * Vt`.
    ///
    /// With `f = |l| l` this reconstructs the decomposed matrix; the
    /// decorrelation stretch uses `f = |l| s / l.sqrt()`.
    pub fn compose<F>(&self, f: F) -> Mat3
    where
        F: Fn(f64) -> f64,
    {
        let d = Mat3::diagonal(f(self.values[0]), f(self.values[1]), f(self.values[2]));
        self.vectors * d * self.vectors.transpose()
    }

    /// Returns eigenvector `i` (0 = dominant axis).
    #[inline]
    pub fn vector(&self, i: usize) -> Vec3 {
        self.vectors.col(i)
    }
}

/// One Jacobi rotation zeroing `a[p][q]`, accumulated into `v`.
fn rotate(a: &mut [[f64; 3]; 3], v: &mut [[f64; 3]; 3], p: usize, q: usize) {
    let apq = a[p][q];
    if apq == 0.0 {
        return;
    }
    let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
    let t = if theta.abs() > 1e150 {
        0.5 / theta
    } else {
        theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt())
    };
    let c = 1.0 / (t * t + 1.0).sqrt();
    let s = t * c;

    for k in 0..3 {
        let akp = a[k][p];
        let akq = a[k][q];
        a[k][p] = c * akp - s * akq;
        a[k][q] = s * akp + c * akq;
    }
    for k in 0..3 {
        let apk = a[p][k];
        let aqk = a[q][k];
        a[p][k] = c * apk - s * aqk;
        a[q][k] = s * apk + c * aqk;
    }
    a[p][q] = 0.0;
    a[q][p] = 0.0;

    for row in v.iter_mut() {
        let vp = row[p];
        let vq = row[q];
        row[p] = c * vp - s * vq;
        row[q] = s * vp + c * vq;
    }
}

fn canonical_sign(v: Vec3) -> Vec3 {
    let mut dominant = v.x;
    for c in [v.y, v.z] {
        if c.abs() > dominant.abs() {
            dominant = c;
        }
    }
    if dominant < 0.0 { v * -1.0 } else { v }
}
