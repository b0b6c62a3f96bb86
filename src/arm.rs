//! Per-arm ridge-regression state.
//!
//! Each arm keeps the sufficient statistics of a ridge regression with unit
//! regularization:
//!
//! - `A` (d x d): starts at the identity, gains `x xᵗ` per observation.
//! - `b` (d): starts at zero, gains `reward * x` per observation.
//!
//! `theta = A⁻¹ b` is recomputed on demand. `A` stays symmetric positive definite
//! (identity plus positive semi-definite terms), so it is always factorable.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::linalg::{
    add_outer, back_sub_transposed, cholesky, cholesky_solve, dot, forward_sub, identity,
    spd_inverse,
};

/// Per-arm score breakdown: `score = mean + bonus`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmScore {
    pub score: f64,
    /// `thetaᵗ x`
    pub mean: f64,
    /// Exploration term (UCB width or posterior draw offset).
    pub bonus: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArmState {
    dim: usize,
    a: Vec<f64>,
    b: Vec<f64>,
    updates: u64,
}

impl ArmState {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            a: identity(dim),
            b: vec![0.0; dim],
            updates: 0,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Design matrix `A`, row-major.
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Response vector `b`.
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Number of rewards applied to this arm.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn a_inverse(&self) -> Vec<f64> {
        spd_inverse(&self.a, self.dim)
    }

    /// Ridge estimate `A⁻¹ b`.
    pub fn theta(&self) -> Vec<f64> {
        let l = cholesky(&self.a, self.dim);
        cholesky_solve(&l, self.dim, &self.b)
    }

    /// `thetaᵗ x + alpha * sqrt(xᵗ A⁻¹ x)`.
    pub(crate) fn ucb(&self, x: &[f64], alpha: f64) -> ArmScore {
        let l = cholesky(&self.a, self.dim);
        let theta = cholesky_solve(&l, self.dim, &self.b);
        let mean = dot(&theta, x);
        // xᵗ A⁻¹ x = |L⁻¹ x|²
        let z = forward_sub(&l, self.dim, x);
        let var = dot(&z, &z).max(0.0);
        let bonus = alpha * var.sqrt();
        ArmScore {
            score: mean + bonus,
            mean,
            bonus,
        }
    }

    /// Average of `samples` draws of `θ̃ᵗ x` with `θ̃ ~ N(theta, scale² A⁻¹)`.
    pub(crate) fn posterior_score<R: Rng>(
        &self,
        x: &[f64],
        scale: f64,
        samples: usize,
        rng: &mut R,
    ) -> ArmScore {
        let l = cholesky(&self.a, self.dim);
        let theta = cholesky_solve(&l, self.dim, &self.b);
        let mean = dot(&theta, x);
        let samples = samples.max(1);
        let mut offset = 0.0;
        for _ in 0..samples {
            // Cov(L⁻ᵗ z) = L⁻ᵗ L⁻¹ = A⁻¹
            let z: Vec<f64> = (0..self.dim)
                .map(|_| rng.sample::<f64, _>(StandardNormal))
                .collect();
            let w = back_sub_transposed(&l, self.dim, &z);
            offset += scale * dot(&w, x);
        }
        let bonus = offset / samples as f64;
        ArmScore {
            score: mean + bonus,
            mean,
            bonus,
        }
    }

    pub(crate) fn observe(&mut self, x: &[f64], reward: f64) {
        add_outer(&mut self.a, self.dim, x);
        for (bi, xi) in self.b.iter_mut().zip(x.iter()) {
            *bi += reward * xi;
        }
        self.updates = self.updates.saturating_add(1);
    }

    /// True when `A` is symmetric and its Cholesky factor has a positive diagonal.
    pub fn is_positive_definite(&self) -> bool {
        let d = self.dim;
        for i in 0..d {
            for j in 0..i {
                if (self.a[i * d + j] - self.a[j * d + i]).abs() > 1e-9 {
                    return false;
                }
            }
        }
        let l = cholesky(&self.a, d);
        (0..d).all(|i| {
            let v = l[i * d + i];
            v.is_finite() && v > 0.0
        })
    }
}
