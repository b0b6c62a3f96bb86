//! The closed set of bandit engines and the common interface over them.
//!
//! [`LinUcb`] and [`LinearThompsonSampling`] share the same two-operation contract:
//! `select_arm(context) -> arm` (read-only on the arm statistics) followed by
//! `update_reward(reward)` applied to that selection. [`ContextualPolicy`] makes the
//! contract explicit; [`BanditModel`] is the tagged variant the knowledge store
//! holds, chosen once by [`ModelKind`] at configuration time.

use crate::{
    ArmState, Context, Decision, LinTsConfig, LinUcb, LinUcbConfig, LinearThompsonSampling,
    MabConfig, Result,
};

/// Common interface for stateful contextual bandit engines.
///
/// # Example
///
/// ```rust
/// use platoon::{Context, ContextualPolicy, LinUcb, LinUcbConfig};
///
/// fn step<P: ContextualPolicy>(p: &mut P, ctx: &Context) -> platoon::Result<usize> {
///     let arm = p.select_arm(ctx)?;
///     p.update_reward(-1.0)?;
///     Ok(arm)
/// }
///
/// let mut p = LinUcb::new(2, LinUcbConfig { dim: 1, alpha: 0.1, seed: 0 }).unwrap();
/// let arm = step(&mut p, &Context::shared(vec![1.0])).unwrap();
/// assert!(arm < 2);
/// ```
pub trait ContextualPolicy {
    /// Choose an arm for `context` and remember it for the next `update_reward`.
    fn decide(&mut self, context: &Context) -> Result<Decision>;

    /// Apply `reward` to the pending selection.
    fn update_reward(&mut self, reward: f64) -> Result<()>;

    fn arms(&self) -> &[ArmState];

    fn dim(&self) -> usize;

    fn select_arm(&mut self, context: &Context) -> Result<usize> {
        Ok(self.decide(context)?.arm)
    }

    fn n_arms(&self) -> usize {
        self.arms().len()
    }
}

impl ContextualPolicy for LinUcb {
    fn decide(&mut self, context: &Context) -> Result<Decision> {
        self.decide(context)
    }
    fn update_reward(&mut self, reward: f64) -> Result<()> {
        self.update_reward(reward)
    }
    fn arms(&self) -> &[ArmState] {
        self.arms()
    }
    fn dim(&self) -> usize {
        self.dim()
    }
}

impl ContextualPolicy for LinearThompsonSampling {
    fn decide(&mut self, context: &Context) -> Result<Decision> {
        self.decide(context)
    }
    fn update_reward(&mut self, reward: f64) -> Result<()> {
        self.update_reward(reward)
    }
    fn arms(&self) -> &[ArmState] {
        self.arms()
    }
    fn dim(&self) -> usize {
        self.dim()
    }
}

/// Engine variants offered by the selection menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModelKind {
    #[value(name = "linucb", alias = "LinearUCB")]
    LinearUcb,
    #[value(name = "lints", alias = "LinearThompsonSampling")]
    LinearThompsonSampling,
}

/// Menu order for interactive selection.
pub const MODELS: [ModelKind; 2] = [ModelKind::LinearUcb, ModelKind::LinearThompsonSampling];

impl ModelKind {
    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::LinearUcb => "LinearUCB",
            ModelKind::LinearThompsonSampling => "LinearThompsonSampling",
        }
    }

    /// Look up a variant by display name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        MODELS
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Construct the engine for `n_arms` arms from the `[mab]` settings.
    pub fn build(self, n_arms: usize, mab: &MabConfig, seed: u64) -> Result<BanditModel> {
        match self {
            ModelKind::LinearUcb => Ok(BanditModel::LinUcb(LinUcb::new(
                n_arms,
                LinUcbConfig {
                    dim: mab.d,
                    alpha: mab.alpha,
                    seed,
                },
            )?)),
            ModelKind::LinearThompsonSampling => {
                Ok(BanditModel::LinearThompsonSampling(LinearThompsonSampling::new(
                    n_arms,
                    LinTsConfig {
                        dim: mab.d,
                        alpha: mab.alpha,
                        epsilon: mab.epsilon,
                        n_bootstrap: mab.n_bootstrap,
                        seed,
                    },
                )?))
            }
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The active engine for a run.
#[derive(Debug, Clone)]
pub enum BanditModel {
    LinUcb(LinUcb),
    LinearThompsonSampling(LinearThompsonSampling),
}

impl BanditModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            BanditModel::LinUcb(_) => ModelKind::LinearUcb,
            BanditModel::LinearThompsonSampling(_) => ModelKind::LinearThompsonSampling,
        }
    }

    pub fn rewards_applied(&self) -> u64 {
        match self {
            BanditModel::LinUcb(p) => p.rewards_applied(),
            BanditModel::LinearThompsonSampling(p) => p.rewards_applied(),
        }
    }

    pub fn pending_arm(&self) -> Option<usize> {
        match self {
            BanditModel::LinUcb(p) => p.pending_arm(),
            BanditModel::LinearThompsonSampling(p) => p.pending_arm(),
        }
    }

    pub fn arm(&self, i: usize) -> Option<&ArmState> {
        ContextualPolicy::arms(self).get(i)
    }
}

impl ContextualPolicy for BanditModel {
    fn decide(&mut self, context: &Context) -> Result<Decision> {
        match self {
            BanditModel::LinUcb(p) => p.decide(context),
            BanditModel::LinearThompsonSampling(p) => p.decide(context),
        }
    }

    fn update_reward(&mut self, reward: f64) -> Result<()> {
        match self {
            BanditModel::LinUcb(p) => p.update_reward(reward),
            BanditModel::LinearThompsonSampling(p) => p.update_reward(reward),
        }
    }

    fn arms(&self) -> &[ArmState] {
        match self {
            BanditModel::LinUcb(p) => p.arms(),
            BanditModel::LinearThompsonSampling(p) => p.arms(),
        }
    }

    fn dim(&self) -> usize {
        match self {
            BanditModel::LinUcb(p) => p.dim(),
            BanditModel::LinearThompsonSampling(p) => p.dim(),
        }
    }
}
