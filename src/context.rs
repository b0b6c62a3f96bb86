//! Context vectors handed to the bandit engine.
//!
//! A context is either one feature vector shared by every arm, or one row per arm
//! (the analyzer produces the latter: each trailing vehicle is described by its own
//! gap). Either way the engine sees a `d`-dimensional vector for arm `i` through
//! [`Context::row`], and that exact row is what enters the arm's sufficient
//! statistics on `update_reward`.

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Context {
    /// One vector broadcast to every arm.
    Shared(Vec<f64>),
    /// One vector per arm, indexed by arm.
    PerArm(Vec<Vec<f64>>),
}

impl Context {
    pub fn shared(x: impl Into<Vec<f64>>) -> Self {
        Context::Shared(x.into())
    }

    pub fn per_arm(rows: Vec<Vec<f64>>) -> Self {
        Context::PerArm(rows)
    }

    /// Feature row used for `arm`.
    pub fn row(&self, arm: usize) -> Option<&[f64]> {
        match self {
            Context::Shared(x) => Some(x.as_slice()),
            Context::PerArm(rows) => rows.get(arm).map(Vec::as_slice),
        }
    }

    /// All stored rows (one for `Shared`).
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        let rows: Vec<&[f64]> = match self {
            Context::Shared(x) => vec![x.as_slice()],
            Context::PerArm(rows) => rows.iter().map(Vec::as_slice).collect(),
        };
        rows.into_iter()
    }

    /// Check the shape against an engine with `n_arms` arms of dimension `dim`.
    pub fn validate(&self, n_arms: usize, dim: usize) -> Result<()> {
        if let Context::PerArm(rows) = self {
            if rows.len() != n_arms {
                return Err(Error::ContextArity {
                    got: rows.len(),
                    expected: n_arms,
                });
            }
        }
        for (row, x) in self.rows().enumerate() {
            if x.len() != dim {
                return Err(Error::ContextDimension {
                    row,
                    got: x.len(),
                    expected: dim,
                });
            }
            if let Some(v) = x.iter().copied().find(|v| !v.is_finite()) {
                return Err(Error::NonFinite {
                    what: "context feature",
                    value: v,
                });
            }
        }
        Ok(())
    }
}
