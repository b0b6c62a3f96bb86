//! Executer stage: act on the plan, score it, advance time, feed the reward back.
//!
//! The corrected vehicle gets a proportional speed change,
//! `clamp(gap - ideal, ±max_speed_modifier)`: speed up when the gap is too large,
//! slow down when it is too small.
//!
//! Penalty is the squared deviation of the corrected vehicle's gap as observed
//! this tick:
//!
//! ```text
//! penalty(k) = (gap_k - ideal)²
//! regret     = penalty(chosen) - min_k penalty(k)
//! ```
//!
//! Regret compares against the best single-vehicle correction available that tick.
//! The subject is advanced first; the engine receives `-penalty` only once the
//! correction has been applied.

use tracing::debug;

use crate::{ContextualPolicy, Correction, Error, Knowledge, Plan, Result, Subject};

/// Squared deviation of a gap from the ideal distance.
pub fn gap_penalty(gap: f64, ideal: f64) -> f64 {
    (gap - ideal).powi(2)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Executer {
    max_speed_modifier: f64,
}

impl Executer {
    pub fn new(max_speed_modifier: f64) -> Self {
        Self { max_speed_modifier }
    }

    pub fn speed_modifier(&self, gap: f64, ideal: f64) -> f64 {
        (gap - ideal).clamp(-self.max_speed_modifier, self.max_speed_modifier)
    }

    /// Penalty and regret of correcting `arm`, given one gap per arm.
    pub fn score(&self, gaps: &[f64], ideal: f64, arm: usize) -> Result<(f64, f64)> {
        let n_arms = gaps.len();
        let gap = *gaps.get(arm).ok_or(Error::ArmOutOfRange { arm, n_arms })?;
        let penalty = gap_penalty(gap, ideal);
        let best = gaps
            .iter()
            .map(|&g| gap_penalty(g, ideal))
            .fold(f64::INFINITY, f64::min);
        Ok((penalty, (penalty - best).max(0.0)))
    }

    pub fn execute<S: Subject + ?Sized>(
        &self,
        plan: &Plan,
        knowledge: &mut Knowledge,
        subject: &mut S,
    ) -> Result<Correction> {
        let gaps = &plan.analysis.gaps;
        let arm = plan.arm();
        let ideal = knowledge.ideal_distance();
        let (penalty, regret) = self.score(gaps, ideal, arm)?;
        let correction = Correction {
            arm,
            speed_modifier: self.speed_modifier(gaps[arm], ideal),
            penalty,
            regret,
        };

        subject.apply(&correction)?;
        knowledge.model_mut().update_reward(-penalty)?;
        debug!(
            arm,
            speed_modifier = correction.speed_modifier,
            penalty,
            regret,
            "correction applied"
        );
        Ok(correction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Analysis, Context, Fleet, LiveFleet, MabConfig, ModelKind};

    #[test]
    fn modifier_is_proportional_and_bounded() {
        let e = Executer::new(1.0);
        assert_eq!(e.speed_modifier(5.5, 5.0), 0.5);
        assert_eq!(e.speed_modifier(3.0, 5.0), -1.0);
        assert_eq!(e.speed_modifier(9.0, 5.0), 1.0);
    }

    #[test]
    fn penalty_follows_the_corrected_gap() {
        let e = Executer::new(1.0);
        let gaps = [3.0, 6.0];
        assert_eq!(e.score(&gaps, 5.0, 0).unwrap(), (4.0, 3.0));
        assert_eq!(e.score(&gaps, 5.0, 1).unwrap(), (1.0, 0.0));
    }

    #[test]
    fn out_of_range_arm_is_an_error() {
        let e = Executer::new(1.0);
        assert!(matches!(
            e.score(&[3.0, 6.0], 5.0, 5),
            Err(Error::ArmOutOfRange { arm: 5, n_arms: 2 })
        ));
    }

    #[test]
    fn failed_apply_leaves_the_engine_untouched() {
        let model = ModelKind::LinearUcb
            .build(2, &MabConfig::default(), 0)
            .unwrap();
        let mut k = Knowledge::new(5.0, model);
        let ctx = Context::per_arm(vec![vec![1.0, -2.0], vec![1.0, 1.0]]);
        let mut decision = k.model_mut().decide(&ctx).unwrap();
        decision.arm = 1;
        let plan = Plan {
            decision,
            analysis: Analysis {
                gaps: vec![3.0, 6.0],
                context: ctx,
            },
        };
        // A two-vehicle fleet has no vehicle behind arm 1.
        let fleet = Fleet::from_kinematics(&[5.0, 0.0], &[1.0, 1.0]).unwrap();
        let mut subject = LiveFleet::new(fleet, 1);

        assert!(matches!(
            Executer::new(1.0).execute(&plan, &mut k, &mut subject),
            Err(Error::ArmOutOfRange { arm: 1, n_arms: 1 })
        ));
        assert_eq!(k.model().rewards_applied(), 0);
        assert_eq!(k.model().arm(1).unwrap().b(), &[0.0, 0.0]);
        assert_eq!(subject.fleet().total_penalty(), 0.0);
    }
}
