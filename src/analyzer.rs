//! Analyzer stage: gaps to per-arm context rows.

use serde::{Deserialize, Serialize};

use crate::{Context, Error, Knowledge, Result};

/// How a gap becomes a feature row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSet {
    /// `[gap]`
    Distance,
    /// `[gap - ideal]`
    Deviation,
    /// `[1.0, gap - ideal]`
    #[default]
    BiasDeviation,
}

impl FeatureSet {
    pub fn dim(self) -> usize {
        match self {
            FeatureSet::Distance | FeatureSet::Deviation => 1,
            FeatureSet::BiasDeviation => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FeatureSet::Distance => "distance",
            FeatureSet::Deviation => "deviation",
            FeatureSet::BiasDeviation => "bias_deviation",
        }
    }

    pub fn row(self, gap: f64, ideal: f64) -> Vec<f64> {
        match self {
            FeatureSet::Distance => vec![gap],
            FeatureSet::Deviation => vec![gap - ideal],
            FeatureSet::BiasDeviation => vec![1.0, gap - ideal],
        }
    }
}

/// Output of the analyzer: the gaps it saw and the context built from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub gaps: Vec<f64>,
    pub context: Context,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analyzer {
    features: FeatureSet,
    n_arms: usize,
}

impl Analyzer {
    pub fn new(features: FeatureSet, n_arms: usize) -> Self {
        Self { features, n_arms }
    }

    pub fn features(&self) -> FeatureSet {
        self.features
    }

    /// Build one context row per trailing vehicle.
    pub fn execute(&self, distances: Vec<f64>, knowledge: &Knowledge) -> Result<Analysis> {
        if distances.len() != self.n_arms {
            return Err(Error::ShapeMismatch {
                what: "distances",
                got: distances.len(),
                expected: self.n_arms,
            });
        }
        let ideal = knowledge.ideal_distance();
        let rows = distances
            .iter()
            .map(|&gap| self.features.row(gap, ideal))
            .collect();
        Ok(Analysis {
            gaps: distances,
            context: Context::per_arm(rows),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MabConfig, ModelKind};

    fn knowledge() -> Knowledge {
        let model = ModelKind::LinearUcb
            .build(2, &MabConfig::default(), 0)
            .unwrap();
        Knowledge::new(5.0, model)
    }

    #[test]
    fn bias_deviation_rows() {
        let a = Analyzer::new(FeatureSet::BiasDeviation, 2);
        let out = a.execute(vec![3.0, 6.0], &knowledge()).unwrap();
        assert_eq!(
            out.context,
            Context::per_arm(vec![vec![1.0, -2.0], vec![1.0, 1.0]])
        );
        assert_eq!(out.gaps, vec![3.0, 6.0]);
    }

    #[test]
    fn single_feature_sets() {
        let k = knowledge();
        let raw = Analyzer::new(FeatureSet::Distance, 2)
            .execute(vec![3.0, 6.0], &k)
            .unwrap();
        assert_eq!(raw.context, Context::per_arm(vec![vec![3.0], vec![6.0]]));
        let dev = Analyzer::new(FeatureSet::Deviation, 2)
            .execute(vec![3.0, 6.0], &k)
            .unwrap();
        assert_eq!(dev.context, Context::per_arm(vec![vec![-2.0], vec![1.0]]));
    }

    #[test]
    fn gap_count_must_match_arms() {
        let a = Analyzer::new(FeatureSet::BiasDeviation, 2);
        // A lead "gap" slipped in: three values for two arms.
        assert!(matches!(
            a.execute(vec![0.0, 3.0, 6.0], &knowledge()),
            Err(Error::ShapeMismatch { got: 3, expected: 2, .. })
        ));
    }
}
