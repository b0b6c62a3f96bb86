//! Linear upper-confidence-bound bandit (LinUCB) with one ridge model per arm.
//!
//! For arm `i` with context row `x`:
//!
//! ```text
//! theta_i = A_i⁻¹ b_i
//! ucb_i   = theta_iᵗ x + alpha * sqrt(xᵗ A_i⁻¹ x)
//! ```
//!
//! The arm with the strictly highest score wins. When several arms share the
//! maximum exactly, one of them is drawn uniformly; taking the first would bias
//! the platoon controller toward low-index vehicles.
//!
//! `select_arm` never touches `A` or `b`. It records the chosen arm and its context
//! row, and the next `update_reward` applies `A += x xᵗ`, `b += r x` to that arm
//! only, using the decision-time row.
//!
//! Randomness (tie-breaks only, here) is seeded per decision from the engine seed,
//! the number of rewards applied so far, and the context; see [`crate::decision_seed`].

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use tracing::trace;

use crate::decision::{argmax_set, Pending};
use crate::{decision_seed, ArmScore, ArmState, Context, Decision, DecisionNote, DecisionPolicy};
use crate::{Error, Result};

/// Configuration for linear UCB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinUcbConfig {
    /// Feature vector dimension (must be >= 1).
    pub dim: usize,
    /// Exploration width (must be finite and > 0).
    pub alpha: f64,
    /// Seed for tie-breaking.
    pub seed: u64,
}

impl Default for LinUcbConfig {
    fn default() -> Self {
        Self {
            dim: 2,
            alpha: 0.1,
            seed: 0,
        }
    }
}

impl LinUcbConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dim == 0 {
            return Err(Error::config("mab.d", "must be >= 1"));
        }
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(Error::config(
                "mab.alpha",
                format!("must be finite and > 0, got {}", self.alpha),
            ));
        }
        Ok(())
    }
}

/// Seedable linear contextual bandit.
///
/// Usage:
/// - `select_arm(&context)` (or `decide` for the full envelope)
/// - `update_reward(reward)` once the outcome of that choice is known
#[derive(Debug, Clone)]
pub struct LinUcb {
    cfg: LinUcbConfig,
    arms: Vec<ArmState>,
    pending: Option<Pending>,
    rewards_applied: u64,
}

impl LinUcb {
    pub fn new(n_arms: usize, cfg: LinUcbConfig) -> Result<Self> {
        cfg.validate()?;
        if n_arms == 0 {
            return Err(Error::config("acvs.num_acvs", "need at least one arm"));
        }
        Ok(Self {
            arms: (0..n_arms).map(|_| ArmState::new(cfg.dim)).collect(),
            cfg,
            pending: None,
            rewards_applied: 0,
        })
    }

    pub fn config(&self) -> &LinUcbConfig {
        &self.cfg
    }

    pub fn n_arms(&self) -> usize {
        self.arms.len()
    }

    pub fn dim(&self) -> usize {
        self.cfg.dim
    }

    pub fn arm(&self, i: usize) -> Option<&ArmState> {
        self.arms.get(i)
    }

    pub fn arms(&self) -> &[ArmState] {
        &self.arms
    }

    pub fn rewards_applied(&self) -> u64 {
        self.rewards_applied
    }

    /// Arm chosen by the last `select_arm` still waiting for its reward.
    pub fn pending_arm(&self) -> Option<usize> {
        self.pending.as_ref().map(|p| p.arm)
    }

    /// Per-arm `(ucb, mean, bonus)` for a context. Pure.
    pub fn scores(&self, context: &Context) -> Result<Vec<ArmScore>> {
        context.validate(self.n_arms(), self.dim())?;
        Ok(self
            .arms
            .iter()
            .enumerate()
            .map(|(i, st)| {
                // validate() guarantees every arm has a row.
                let x = context.row(i).unwrap_or_default();
                st.ucb(x, self.cfg.alpha)
            })
            .collect())
    }

    /// Select (argmax UCB, uniform among exact ties) and return a `Decision`.
    pub fn decide(&mut self, context: &Context) -> Result<Decision> {
        let scores: Vec<f64> = self.scores(context)?.iter().map(|s| s.score).collect();
        let tied = argmax_set(&scores);

        let (arm, notes) = if tied.len() == 1 {
            (tied[0], vec![DecisionNote::DeterministicChoice])
        } else {
            let mut rng =
                StdRng::seed_from_u64(decision_seed(self.cfg.seed, self.rewards_applied, context));
            let arm = tied[rng.random_range(0..tied.len())];
            (arm, vec![DecisionNote::TieBroken { tied }])
        };

        let x = context.row(arm).unwrap_or_default().to_vec();
        self.pending = Some(Pending { arm, x });
        trace!(arm, ?scores, "linucb decision");

        Ok(Decision {
            policy: DecisionPolicy::LinUcb,
            arm,
            scores,
            notes,
        })
    }

    pub fn select_arm(&mut self, context: &Context) -> Result<usize> {
        Ok(self.decide(context)?.arm)
    }

    /// Apply `reward` to the arm and context of the most recent selection.
    pub fn update_reward(&mut self, reward: f64) -> Result<()> {
        if !reward.is_finite() {
            return Err(Error::NonFinite {
                what: "reward",
                value: reward,
            });
        }
        let Pending { arm, x } = self.pending.take().ok_or(Error::NoPendingSelection)?;
        let n_arms = self.arms.len();
        let st = self
            .arms
            .get_mut(arm)
            .ok_or(Error::ArmOutOfRange { arm, n_arms })?;
        st.observe(&x, reward);
        self.rewards_applied = self.rewards_applied.saturating_add(1);
        Ok(())
    }

    /// Per-arm `theta` vectors.
    pub fn theta_vectors(&self) -> Vec<Vec<f64>> {
        self.arms.iter().map(ArmState::theta).collect()
    }
}
