//! Unified decision envelope for engine outputs.
//!
//! Every `select_arm` goes through a `decide` call that returns one of these. The
//! planner logs it and the executer reads the chosen arm from it. Notes say why
//! the choice happened (argmax, tie-break, posterior sample, exploration floor).

/// Which engine produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionPolicy {
    LinUcb,
    LinearThompsonSampling,
}

/// Audit notes attached to a decision.
///
/// Prefer adding variants over changing existing semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionNote {
    /// Unique argmax of the scores.
    DeterministicChoice,

    /// Several arms shared the maximal score; one was drawn uniformly.
    TieBroken { tied: Vec<usize> },

    /// Scores were posterior samples averaged over `samples` draws.
    SampledPosteriorMax { samples: usize },

    /// The exploration floor fired; the arm was drawn uniformly, scores ignored.
    ExplorationFloor { epsilon: f64 },
}

/// A single engine decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub policy: DecisionPolicy,
    /// Chosen arm (trailing-vehicle index, `0..n_arms`).
    pub arm: usize,
    /// Per-arm scores in arm order.
    pub scores: Vec<f64>,
    pub notes: Vec<DecisionNote>,
}

impl Decision {
    pub fn was_tie_broken(&self) -> bool {
        self.notes
            .iter()
            .any(|n| matches!(n, DecisionNote::TieBroken { .. }))
    }
}

/// Context row retained between `select_arm` and the matching `update_reward`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Pending {
    pub(crate) arm: usize,
    pub(crate) x: Vec<f64>,
}

/// Indices holding the maximal score (exact comparison).
pub(crate) fn argmax_set(scores: &[f64]) -> Vec<usize> {
    let mut best = f64::NEG_INFINITY;
    let mut out = Vec::new();
    for (i, &s) in scores.iter().enumerate() {
        if s > best {
            best = s;
            out.clear();
            out.push(i);
        } else if s == best {
            out.push(i);
        }
    }
    out
}
