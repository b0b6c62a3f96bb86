//! The control loop: Monitor → Analyzer → Planner → Executer, once per tick.
//!
//! Stages are composed statically and pass typed values along:
//!
//! ```text
//! Snapshot ──Monitor──▶ distances ──Analyzer──▶ Analysis ──Planner──▶ Plan ──Executer──▶ Correction
//! ```
//!
//! Each tick runs to completion before the subject is asked for the next snapshot.
//! The run ends when the subject returns `None` (tick budget or trace exhausted).
//! Any stage error aborts the run.

use tracing::{debug, info};

use crate::{
    Analyzer, ContextualPolicy, Correction, Executer, Knowledge, Monitor, Planner, Result,
    Subject,
};

/// Summary of one finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub run: usize,
    pub ticks: u64,
    pub monitor_invocations: u64,
    /// Times each arm was corrected.
    pub arm_pulls: Vec<u64>,
    pub total_penalty: f64,
    pub total_regret: f64,
    pub final_gaps: Vec<f64>,
    /// Mean `|gap - ideal|` over the final gaps.
    pub final_mean_abs_deviation: f64,
}

#[derive(Debug, Clone)]
pub struct ControlLoop {
    monitor: Monitor,
    analyzer: Analyzer,
    planner: Planner,
    executer: Executer,
}

impl ControlLoop {
    pub fn new(analyzer: Analyzer, executer: Executer) -> Self {
        Self {
            monitor: Monitor::new(),
            analyzer,
            planner: Planner,
            executer,
        }
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    /// Run one tick. `Ok(None)` means the subject had nothing left.
    pub fn tick<S: Subject + ?Sized>(
        &mut self,
        knowledge: &mut Knowledge,
        subject: &mut S,
    ) -> Result<Option<Correction>> {
        let Some(snapshot) = subject.next_snapshot() else {
            return Ok(None);
        };
        let distances = self.monitor.update(
            knowledge,
            &snapshot.distances,
            &snapshot.speeds,
            &snapshot.locations,
        );
        let analysis = self.analyzer.execute(distances, knowledge)?;
        let plan = self.planner.execute(analysis, knowledge)?;
        let correction = self.executer.execute(&plan, knowledge, subject)?;
        Ok(Some(correction))
    }

    /// Drive `subject` until it is exhausted.
    pub fn run<S: Subject + ?Sized>(
        &mut self,
        run: usize,
        knowledge: &mut Knowledge,
        subject: &mut S,
    ) -> Result<RunReport> {
        let n_arms = knowledge.model().n_arms();
        let mut arm_pulls = vec![0u64; n_arms];
        let mut ticks = 0u64;
        let start_invocations = self.monitor.invocations();

        info!(
            run,
            model = %knowledge.model().kind(),
            vehicles = subject.fleet().len(),
            "run started"
        );
        while let Some(c) = self.tick(knowledge, subject)? {
            ticks += 1;
            if let Some(p) = arm_pulls.get_mut(c.arm) {
                *p += 1;
            }
            debug!(run, tick = ticks, arm = c.arm, penalty = c.penalty, "tick");
        }

        let fleet = subject.fleet();
        let ideal = knowledge.ideal_distance();
        let final_gaps = fleet.gaps();
        let final_mean_abs_deviation = if final_gaps.is_empty() {
            0.0
        } else {
            final_gaps.iter().map(|g| (g - ideal).abs()).sum::<f64>() / final_gaps.len() as f64
        };
        let report = RunReport {
            run,
            ticks,
            monitor_invocations: self.monitor.invocations() - start_invocations,
            arm_pulls,
            total_penalty: fleet.total_penalty(),
            total_regret: fleet.total_regret(),
            final_gaps,
            final_mean_abs_deviation,
        };
        info!(
            run,
            ticks,
            total_penalty = report.total_penalty,
            total_regret = report.total_regret,
            "run finished"
        );
        Ok(report)
    }
}
