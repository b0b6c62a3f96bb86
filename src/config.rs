//! Run configuration, loaded once from TOML and immutable for the run.
//!
//! ```toml
//! [mab]
//! d = 2
//! alpha = 0.1
//! epsilon = 0.1
//! n_bootstrap = 1
//! features = "bias_deviation"
//! seed = 0
//!
//! [acvs]
//! num_acvs = 5
//! ideal_distance = 5.0
//!
//! [simulation]
//! num_simulation_runs = 1
//! max_ticks = 100
//! ```
//!
//! Every key is optional; missing keys take the defaults below. [`Config::validate`]
//! runs on every load, so a `Config` obtained from [`Config::from_toml_str`] or
//! [`Config::load`] is always usable.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, FeatureSet, Result, MAX_SPEED};

/// Bandit engine settings (`[mab]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MabConfig {
    /// Context dimensionality; must match `features`.
    pub d: usize,
    /// UCB exploration width / Thompson posterior scale.
    pub alpha: f64,
    /// Thompson exploration floor, `[0, 1)`.
    pub epsilon: f64,
    /// Thompson posterior draws per decision.
    pub n_bootstrap: usize,
    pub features: FeatureSet,
    /// Base seed; run `k` uses `seed + k`.
    pub seed: u64,
}

impl Default for MabConfig {
    fn default() -> Self {
        Self {
            d: 2,
            alpha: 0.1,
            epsilon: 0.1,
            n_bootstrap: 1,
            features: FeatureSet::BiasDeviation,
            seed: 0,
        }
    }
}

/// Platoon settings (`[acvs]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AcvsConfig {
    /// Vehicles including the lead; arms = `num_acvs - 1`.
    pub num_acvs: usize,
    pub ideal_distance: f64,
    /// Bound on a single correction's magnitude.
    pub max_speed_modifier: f64,
    /// Starting speed of every vehicle in live mode.
    pub initial_speed: f64,
    /// Starting gaps are `ideal_distance ± U(0, initial_gap_jitter)` in live mode.
    pub initial_gap_jitter: f64,
}

impl Default for AcvsConfig {
    fn default() -> Self {
        Self {
            num_acvs: 5,
            ideal_distance: 5.0,
            max_speed_modifier: 1.0,
            initial_speed: 1.0,
            initial_gap_jitter: 2.0,
        }
    }
}

impl AcvsConfig {
    pub fn n_arms(&self) -> usize {
        self.num_acvs.saturating_sub(1)
    }
}

/// Simulation driver settings (`[simulation]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub num_simulation_runs: usize,
    /// Tick budget per run (live mode length; upper bound in trace mode).
    pub max_ticks: u64,
    /// Standard deviation of the lead vehicle's per-tick speed change in live mode.
    pub lead_speed_jitter: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_simulation_runs: 1,
            max_ticks: 100,
            lead_speed_jitter: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub mab: MabConfig,
    pub acvs: AcvsConfig,
    pub simulation: SimulationConfig,
}

fn positive(key: &'static str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(Error::config(key, format!("must be finite and > 0, got {v}")))
    }
}

fn non_negative(key: &'static str, v: f64) -> Result<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(Error::config(key, format!("must be finite and >= 0, got {v}")))
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let mab = &self.mab;
        if mab.d == 0 {
            return Err(Error::config("mab.d", "must be >= 1"));
        }
        if mab.d != mab.features.dim() {
            return Err(Error::config(
                "mab.d",
                format!(
                    "features `{}` produce {} values per arm, but d = {}",
                    mab.features.name(),
                    mab.features.dim(),
                    mab.d
                ),
            ));
        }
        positive("mab.alpha", mab.alpha)?;
        if !(mab.epsilon.is_finite() && (0.0..1.0).contains(&mab.epsilon)) {
            return Err(Error::config(
                "mab.epsilon",
                format!("must be in [0, 1), got {}", mab.epsilon),
            ));
        }
        if mab.n_bootstrap == 0 {
            return Err(Error::config("mab.n_bootstrap", "must be >= 1"));
        }

        let acvs = &self.acvs;
        if acvs.num_acvs < 2 {
            return Err(Error::config(
                "acvs.num_acvs",
                format!("need a lead and at least one follower, got {}", acvs.num_acvs),
            ));
        }
        positive("acvs.ideal_distance", acvs.ideal_distance)?;
        positive("acvs.max_speed_modifier", acvs.max_speed_modifier)?;
        if !(acvs.initial_speed.is_finite() && acvs.initial_speed.abs() <= MAX_SPEED) {
            return Err(Error::config(
                "acvs.initial_speed",
                format!("must be within ±{MAX_SPEED}, got {}", acvs.initial_speed),
            ));
        }
        non_negative("acvs.initial_gap_jitter", acvs.initial_gap_jitter)?;

        let sim = &self.simulation;
        if sim.num_simulation_runs == 0 {
            return Err(Error::config("simulation.num_simulation_runs", "must be >= 1"));
        }
        if sim.max_ticks == 0 {
            return Err(Error::config("simulation.max_ticks", "must be >= 1"));
        }
        non_negative("simulation.lead_speed_jitter", sim.lead_speed_jitter)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Config::default().validate().unwrap();
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let cfg = Config::from_toml_str(
            r#"
            [mab]
            alpha = 0.5

            [acvs]
            num_acvs = 3
            "#,
        )
        .unwrap();
        assert_eq!(cfg.mab.alpha, 0.5);
        assert_eq!(cfg.mab.d, 2);
        assert_eq!(cfg.acvs.n_arms(), 2);
        assert_eq!(cfg.simulation.num_simulation_runs, 1);
    }

    #[test]
    fn dimension_must_match_feature_set() {
        let err = Config::from_toml_str("[mab]\nd = 3\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { key: "mab.d", .. }), "{err}");

        let cfg = Config::from_toml_str("[mab]\nd = 1\nfeatures = \"deviation\"\n").unwrap();
        assert_eq!(cfg.mab.features, FeatureSet::Deviation);
    }

    #[test]
    fn rejects_invalid_numbers() {
        for (text, key) in [
            ("[mab]\nalpha = 0.0\n", "mab.alpha"),
            ("[mab]\nalpha = -1.0\n", "mab.alpha"),
            ("[mab]\nepsilon = 1.5\n", "mab.epsilon"),
            ("[mab]\nn_bootstrap = 0\n", "mab.n_bootstrap"),
            ("[acvs]\nnum_acvs = 1\n", "acvs.num_acvs"),
            ("[acvs]\nideal_distance = 0.0\n", "acvs.ideal_distance"),
            ("[acvs]\ninitial_speed = 1000.0\n", "acvs.initial_speed"),
            ("[simulation]\nnum_simulation_runs = 0\n", "simulation.num_simulation_runs"),
            ("[simulation]\nmax_ticks = 0\n", "simulation.max_ticks"),
        ] {
            match Config::from_toml_str(text) {
                Err(Error::InvalidConfig { key: k, .. }) => assert_eq!(k, key, "{text}"),
                other => panic!("{text}: expected {key} error, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_keys_and_bad_syntax_are_parse_errors() {
        assert!(matches!(
            Config::from_toml_str("[mab]\ngamma = 1\n"),
            Err(Error::ConfigParse(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[mab\n"),
            Err(Error::ConfigParse(_))
        ));
    }
}
