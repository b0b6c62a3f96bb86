//! Simulation driver: builds per-run resources from a [`Config`] and runs them.
//!
//! Every run gets its own knowledge store, engine and subject; run `k` is seeded
//! with `mab.seed + k`. Runs execute one after another.

use tracing::info;

use crate::{
    Analyzer, Config, ControlLoop, Executer, Knowledge, LiveFleet, ModelKind, Result,
    RunReport, Subject, Trace, TracePlayback,
};

#[derive(Debug, Clone)]
pub struct Simulation {
    config: Config,
    model: ModelKind,
}

impl Simulation {
    pub fn new(config: Config, model: ModelKind) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, model })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn model(&self) -> ModelKind {
        self.model
    }

    fn run_seed(&self, run: usize) -> u64 {
        self.config.mab.seed.wrapping_add(run as u64)
    }

    fn run_one<S: Subject>(&self, run: usize, subject: &mut S) -> Result<RunReport> {
        let n_arms = subject.fleet().n_arms();
        let model = self.model.build(n_arms, &self.config.mab, self.run_seed(run))?;
        let mut knowledge = Knowledge::new(self.config.acvs.ideal_distance, model);
        let mut control = ControlLoop::new(
            Analyzer::new(self.config.mab.features, n_arms),
            Executer::new(self.config.acvs.max_speed_modifier),
        );
        control.run(run, &mut knowledge, subject)
    }

    /// Live stepping, `simulation.max_ticks` ticks per run.
    pub fn run_live(&self) -> Result<Vec<RunReport>> {
        info!(
            model = %self.model,
            runs = self.config.simulation.num_simulation_runs,
            "live simulation"
        );
        (0..self.config.simulation.num_simulation_runs)
            .map(|run| {
                let mut fleet = LiveFleet::from_config(
                    &self.config.acvs,
                    &self.config.simulation,
                    self.run_seed(run),
                )?;
                self.run_one(run, &mut fleet)
            })
            .collect()
    }

    /// Replay `trace` once per configured run.
    pub fn run_trace(&self, trace: &Trace) -> Result<Vec<RunReport>> {
        info!(
            model = %self.model,
            frames = trace.len(),
            runs = self.config.simulation.num_simulation_runs,
            "trace playback"
        );
        (0..self.config.simulation.num_simulation_runs)
            .map(|run| {
                let mut playback = TracePlayback::new(
                    trace.clone(),
                    self.config.acvs.num_acvs,
                    self.config.simulation.max_ticks,
                )?;
                self.run_one(run, &mut playback)
            })
            .collect()
    }
}
