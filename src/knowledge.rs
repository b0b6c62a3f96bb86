//! Per-run knowledge shared by the loop stages.
//!
//! One value per simulation run, owned by the run and lent to each stage by `&mut`.
//! Snapshot fields are replaced wholesale every tick.

use crate::BanditModel;

#[derive(Debug, Clone)]
pub struct Knowledge {
    ideal_distance: f64,
    mab_model: BanditModel,
    starting_speeds: Vec<f64>,
    locations: Vec<f64>,
}

impl Knowledge {
    pub fn new(ideal_distance: f64, mab_model: BanditModel) -> Self {
        Self {
            ideal_distance,
            mab_model,
            starting_speeds: Vec::new(),
            locations: Vec::new(),
        }
    }

    pub fn ideal_distance(&self) -> f64 {
        self.ideal_distance
    }

    pub fn model(&self) -> &BanditModel {
        &self.mab_model
    }

    pub fn model_mut(&mut self) -> &mut BanditModel {
        &mut self.mab_model
    }

    /// Speeds observed at the start of the current tick.
    pub fn starting_speeds(&self) -> &[f64] {
        &self.starting_speeds
    }

    pub fn locations(&self) -> &[f64] {
        &self.locations
    }

    pub(crate) fn record(&mut self, starting_speeds: Vec<f64>, locations: Vec<f64>) {
        self.starting_speeds = starting_speeds;
        self.locations = locations;
    }

    pub fn into_model(self) -> BanditModel {
        self.mab_model
    }
}
