//! One autonomously controlled vehicle moving in one dimension.

use crate::{Error, Result};

/// Speed bound; every update clamps into `[-MAX_SPEED, MAX_SPEED]`.
pub const MAX_SPEED: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Acv {
    index: usize,
    location: f64,
    speed: f64,
    distance: Option<f64>,
    total_penalty: f64,
    total_regret: f64,
}

impl Acv {
    pub fn new(index: usize, start_location: f64, start_speed: f64) -> Self {
        Self {
            index,
            location: start_location,
            speed: start_speed.clamp(-MAX_SPEED, MAX_SPEED),
            distance: None,
            total_penalty: 0.0,
            total_regret: 0.0,
        }
    }

    /// Platoon position; 0 is the lead.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_lead(&self) -> bool {
        self.index == 0
    }

    pub fn location(&self) -> f64 {
        self.location
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Gap to the vehicle ahead; `None` for the lead.
    pub fn distance(&self) -> Option<f64> {
        self.distance
    }

    pub fn total_penalty(&self) -> f64 {
        self.total_penalty
    }

    pub fn total_regret(&self) -> f64 {
        self.total_regret
    }

    /// Charge `penalty`/`regret`, apply `speed_modifier`, clamp, and move one tick.
    ///
    /// Penalty and regret must be finite and non-negative; the accumulators never
    /// decrease.
    pub fn update(&mut self, speed_modifier: f64, penalty: f64, regret: f64) -> Result<()> {
        if !speed_modifier.is_finite() {
            return Err(Error::NonFinite {
                what: "speed modifier",
                value: speed_modifier,
            });
        }
        for (what, value) in [("penalty", penalty), ("regret", regret)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidAccumulator { what, value });
            }
        }

        self.total_penalty += penalty;
        self.total_regret += regret;

        self.speed = (self.speed + speed_modifier).clamp(-MAX_SPEED, MAX_SPEED);
        self.location += self.speed;
        Ok(())
    }

    pub(crate) fn set_distance(&mut self, distance: Option<f64>) {
        self.distance = distance;
    }

    /// Overwrite kinematics from an external source (trace playback).
    pub(crate) fn sync(&mut self, location: f64, speed: f64) {
        self.location = location;
        self.speed = speed.clamp(-MAX_SPEED, MAX_SPEED);
    }
}
