//! Error type shared by the bandit engine, the control loop, and the I/O glue.
//!
//! Three families live here:
//! - configuration errors, surfaced before any tick runs;
//! - contract violations (bad arm index, reward without a selection, context shape),
//!   which abort the run instead of being clamped;
//! - trace decoding errors.
//!
//! Trace exhaustion is not an error: subjects report it by returning `None`.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration `{key}`: {reason}")]
    InvalidConfig { key: &'static str, reason: String },

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to decode trace: {0}")]
    TraceDecode(#[from] serde_json::Error),

    #[error("trace frame {tick}: {reason}")]
    InvalidTrace { tick: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("arm index {arm} out of range for {n_arms} arms")]
    ArmOutOfRange { arm: usize, n_arms: usize },

    #[error("update_reward called without a pending select_arm")]
    NoPendingSelection,

    #[error("context row {row} has dimension {got}, expected {expected}")]
    ContextDimension {
        row: usize,
        got: usize,
        expected: usize,
    },

    #[error("context has {got} rows, expected 1 (shared) or {expected} (per arm)")]
    ContextArity { got: usize, expected: usize },

    #[error("{what}: got {got} entries, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("{what} must be finite, got {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("{what} must be finite and non-negative, got {value}")]
    InvalidAccumulator { what: &'static str, value: f64 },
}

impl Error {
    pub(crate) fn config(key: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            key,
            reason: reason.into(),
        }
    }
}
