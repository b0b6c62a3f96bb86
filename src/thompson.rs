//! Linear Thompson sampling over the same per-arm ridge statistics as LinUCB.
//!
//! Instead of a deterministic upper bound, each arm is scored by sampling
//! coefficient vectors from the Gaussian posterior approximation
//!
//! ```text
//! θ̃_i ~ N(theta_i, alpha² A_i⁻¹)
//! ```
//!
//! and averaging `θ̃_iᵗ x` over `n_bootstrap` draws. `n_bootstrap = 1` is classic
//! Thompson sampling; larger values pull the score toward the posterior mean.
//! With probability `epsilon` the decision ignores the scores and draws an arm
//! uniformly, a floor on exploration for arms whose posterior has collapsed early.
//!
//! Notes:
//! - Draws come from an RNG seeded per decision (engine seed, rewards applied, context),
//!   so a repeated `select_arm` without an intervening reward returns the same arm.
//! - The reward update is identical to LinUCB: `A += x xᵗ`, `b += r x` on the chosen arm.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use tracing::trace;

use crate::decision::{argmax_set, Pending};
use crate::{decision_seed, ArmScore, ArmState, Context, Decision, DecisionNote, DecisionPolicy};
use crate::{Error, Result};

/// Configuration for linear Thompson sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinTsConfig {
    /// Feature vector dimension (must be >= 1).
    pub dim: usize,
    /// Posterior scale (must be finite and > 0).
    pub alpha: f64,
    /// Probability of a uniform exploratory pick, in `[0, 1)`.
    pub epsilon: f64,
    /// Posterior draws averaged per arm per decision (must be >= 1).
    pub n_bootstrap: usize,
    pub seed: u64,
}

impl Default for LinTsConfig {
    fn default() -> Self {
        Self {
            dim: 2,
            alpha: 0.1,
            epsilon: 0.1,
            n_bootstrap: 1,
            seed: 0,
        }
    }
}

impl LinTsConfig {
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
        if !(self.epsilon.is_finite() && (0.0..1.0).contains(&self.epsilon)) {
            return Err(Error::config(
                "mab.epsilon",
                format!("must be in [0, 1), got {}", self.epsilon),
            ));
        }
        if self.n_bootstrap == 0 {
            return Err(Error::config("mab.n_bootstrap", "must be >= 1"));
        }
        Ok(())
    }
}

/// Seedable linear Thompson-sampling bandit.
#[derive(Debug, Clone)]
pub struct LinearThompsonSampling {
    cfg: LinTsConfig,
    arms: Vec<ArmState>,
    pending: Option<Pending>,
    rewards_applied: u64,
}

impl LinearThompsonSampling {
    pub fn new(n_arms: usize, cfg: LinTsConfig) -> Result<Self> {
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

    pub fn config(&self) -> &LinTsConfig {
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

    pub fn pending_arm(&self) -> Option<usize> {
        self.pending.as_ref().map(|p| p.arm)
    }

    fn sampled_scores(&self, context: &Context, rng: &mut StdRng) -> Vec<ArmScore> {
        self.arms
            .iter()
            .enumerate()
            .map(|(i, st)| {
                let x = context.row(i).unwrap_or_default();
                st.posterior_score(x, self.cfg.alpha, self.cfg.n_bootstrap, rng)
            })
            .collect()
    }

    /// Sample per-arm scores and return a `Decision`.
    pub fn decide(&mut self, context: &Context) -> Result<Decision> {
        context.validate(self.n_arms(), self.dim())?;
        let mut rng =
            StdRng::seed_from_u64(decision_seed(self.cfg.seed, self.rewards_applied, context));

        let explore = self.cfg.epsilon > 0.0 && rng.random::<f64>() < self.cfg.epsilon;
        let scores: Vec<f64> = self
            .sampled_scores(context, &mut rng)
            .iter()
            .map(|s| s.score)
            .collect();

        let (arm, notes) = if explore {
            let arm = rng.random_range(0..self.n_arms());
            (
                arm,
                vec![DecisionNote::ExplorationFloor {
                    epsilon: self.cfg.epsilon,
                }],
            )
        } else {
            let tied = argmax_set(&scores);
            let sampled = DecisionNote::SampledPosteriorMax {
                samples: self.cfg.n_bootstrap,
            };
            if tied.len() == 1 {
                (tied[0], vec![sampled])
            } else {
                let arm = tied[rng.random_range(0..tied.len())];
                (arm, vec![sampled, DecisionNote::TieBroken { tied }])
            }
        };

        let x = context.row(arm).unwrap_or_default().to_vec();
        self.pending = Some(Pending { arm, x });
        trace!(arm, explore, ?scores, "linear thompson decision");

        Ok(Decision {
            policy: DecisionPolicy::LinearThompsonSampling,
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
}
