//! The vehicle fleet and the subjects that feed the control loop.
//!
//! A [`Subject`] produces one [`Snapshot`] per tick and accepts the loop's
//! [`Correction`] for that tick. Two implementations:
//!
//! - [`LiveFleet`]: steps the kinematics itself for a bounded number of ticks.
//! - [`crate::TracePlayback`]: replays recorded positions and speeds, still charging
//!   penalties and regret to the fleet.
//!
//! Snapshot layout: `speeds` and `locations` have one entry per vehicle (lead first);
//! `distances` has one entry per trailing vehicle, so `distances[i]` is the gap in
//! front of vehicle `i + 1`, which is arm `i`.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::{Acv, AcvsConfig, Error, Result, SimulationConfig};

/// Sensor readings for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub distances: Vec<f64>,
    pub speeds: Vec<f64>,
    pub locations: Vec<f64>,
}

/// The actuation decided for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    /// Arm index; the corrected vehicle is `arm + 1`.
    pub arm: usize,
    pub speed_modifier: f64,
    pub penalty: f64,
    pub regret: f64,
}

impl Correction {
    pub fn vehicle(&self) -> usize {
        self.arm + 1
    }
}

/// Source of sensor snapshots and target of corrections.
pub trait Subject {
    /// Next tick's readings, or `None` once the input or tick budget is exhausted.
    fn next_snapshot(&mut self) -> Option<Snapshot>;

    /// Apply the tick's correction and advance simulated time by one step.
    fn apply(&mut self, correction: &Correction) -> Result<()>;

    fn fleet(&self) -> &Fleet;
}

/// All vehicles of one run, lead first.
#[derive(Debug, Clone, PartialEq)]
pub struct Fleet {
    acvs: Vec<Acv>,
}

impl Fleet {
    pub fn from_kinematics(locations: &[f64], speeds: &[f64]) -> Result<Self> {
        if locations.len() < 2 {
            return Err(Error::ShapeMismatch {
                what: "fleet vehicles",
                got: locations.len(),
                expected: 2,
            });
        }
        if speeds.len() != locations.len() {
            return Err(Error::ShapeMismatch {
                what: "fleet speeds",
                got: speeds.len(),
                expected: locations.len(),
            });
        }
        let acvs = locations
            .iter()
            .zip(speeds.iter())
            .enumerate()
            .map(|(i, (&loc, &speed))| Acv::new(i, loc, speed))
            .collect();
        let mut fleet = Self { acvs };
        fleet.refresh_distances();
        Ok(fleet)
    }

    pub fn acvs(&self) -> &[Acv] {
        &self.acvs
    }

    pub fn len(&self) -> usize {
        self.acvs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acvs.is_empty()
    }

    /// Trailing vehicles, one arm each.
    pub fn n_arms(&self) -> usize {
        self.acvs.len() - 1
    }

    /// Gap in front of each trailing vehicle.
    pub fn gaps(&self) -> Vec<f64> {
        self.acvs.iter().filter_map(Acv::distance).collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            distances: self.gaps(),
            speeds: self.acvs.iter().map(Acv::speed).collect(),
            locations: self.acvs.iter().map(Acv::location).collect(),
        }
    }

    pub fn total_penalty(&self) -> f64 {
        self.acvs.iter().map(Acv::total_penalty).sum()
    }

    pub fn total_regret(&self) -> f64 {
        self.acvs.iter().map(Acv::total_regret).sum()
    }

    fn refresh_distances(&mut self) {
        let mut ahead: Option<f64> = None;
        for acv in &mut self.acvs {
            acv.set_distance(ahead.map(|loc| loc - acv.location()));
            ahead = Some(acv.location());
        }
    }

    pub(crate) fn sync(&mut self, locations: &[f64], speeds: &[f64]) -> Result<()> {
        if locations.len() != self.len() || speeds.len() != self.len() {
            return Err(Error::ShapeMismatch {
                what: "fleet sync",
                got: locations.len().min(speeds.len()),
                expected: self.len(),
            });
        }
        for (acv, (&loc, &speed)) in self.acvs.iter_mut().zip(locations.iter().zip(speeds)) {
            acv.sync(loc, speed);
        }
        self.refresh_distances();
        Ok(())
    }

    /// Move every vehicle one tick. The corrected vehicle gets the modifier, penalty
    /// and regret; the lead gets `lead_modifier`; everyone else coasts.
    pub fn advance(&mut self, correction: &Correction, lead_modifier: f64) -> Result<()> {
        let n_arms = self.n_arms();
        if correction.arm >= n_arms {
            return Err(Error::ArmOutOfRange {
                arm: correction.arm,
                n_arms,
            });
        }
        // Validate on a scratch copy first so a rejected correction moves nobody.
        let target = correction.vehicle();
        let mut probe = self.acvs[target].clone();
        probe.update(correction.speed_modifier, correction.penalty, correction.regret)?;
        if !lead_modifier.is_finite() {
            return Err(Error::NonFinite {
                what: "lead speed modifier",
                value: lead_modifier,
            });
        }

        for acv in &mut self.acvs {
            if acv.index() == target {
                acv.update(
                    correction.speed_modifier,
                    correction.penalty,
                    correction.regret,
                )?;
            } else if acv.is_lead() {
                acv.update(lead_modifier, 0.0, 0.0)?;
            } else {
                acv.update(0.0, 0.0, 0.0)?;
            }
        }
        self.refresh_distances();
        Ok(())
    }
}

/// Self-stepping fleet bounded by a tick budget.
#[derive(Debug, Clone)]
pub struct LiveFleet {
    fleet: Fleet,
    rng: StdRng,
    lead_jitter: Option<Normal<f64>>,
    max_ticks: u64,
    emitted: u64,
}

impl LiveFleet {
    pub fn new(fleet: Fleet, max_ticks: u64) -> Self {
        Self {
            fleet,
            rng: StdRng::seed_from_u64(0),
            lead_jitter: None,
            max_ticks,
            emitted: 0,
        }
    }

    /// Lay the platoon out behind a lead at the origin with jittered gaps.
    pub fn from_config(acvs: &AcvsConfig, sim: &SimulationConfig, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut locations = Vec::with_capacity(acvs.num_acvs);
        let mut loc = 0.0;
        for i in 0..acvs.num_acvs {
            if i > 0 {
                let j = acvs.initial_gap_jitter;
                let jitter = if j > 0.0 { rng.random_range(-j..=j) } else { 0.0 };
                loc -= acvs.ideal_distance + jitter;
            }
            locations.push(loc);
        }
        let speeds = vec![acvs.initial_speed; acvs.num_acvs];
        let fleet = Fleet::from_kinematics(&locations, &speeds)?;

        let lead_jitter = if sim.lead_speed_jitter > 0.0 {
            let dist = Normal::new(0.0, sim.lead_speed_jitter).map_err(|e| {
                Error::config("simulation.lead_speed_jitter", e.to_string())
            })?;
            Some(dist)
        } else {
            None
        };
        debug!(?locations, "live fleet laid out");

        Ok(Self {
            fleet,
            rng,
            lead_jitter,
            max_ticks: sim.max_ticks,
            emitted: 0,
        })
    }

    pub fn ticks_emitted(&self) -> u64 {
        self.emitted
    }
}

impl Subject for LiveFleet {
    fn next_snapshot(&mut self) -> Option<Snapshot> {
        if self.emitted >= self.max_ticks {
            return None;
        }
        self.emitted += 1;
        Some(self.fleet.snapshot())
    }

    fn apply(&mut self, correction: &Correction) -> Result<()> {
        let lead_modifier = match &self.lead_jitter {
            Some(dist) => dist.sample(&mut self.rng),
            None => 0.0,
        };
        self.fleet.advance(correction, lead_modifier)
    }

    fn fleet(&self) -> &Fleet {
        &self.fleet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> Fleet {
        Fleet::from_kinematics(&[9.0, 6.0, 0.0], &[1.0, 1.0, 1.0]).unwrap()
    }

    #[test]
    fn distances_skip_the_lead() {
        let f = three();
        assert_eq!(f.acvs()[0].distance(), None);
        let s = f.snapshot();
        assert_eq!(s.distances, vec![3.0, 6.0]);
        assert_eq!(s.speeds.len(), 3);
        assert_eq!(f.n_arms(), 2);
    }

    #[test]
    fn advance_charges_only_the_corrected_vehicle() {
        let mut f = three();
        let c = Correction {
            arm: 0,
            speed_modifier: -1.0,
            penalty: 1.0,
            regret: 0.5,
        };
        f.advance(&c, 0.0).unwrap();
        let locs: Vec<f64> = f.acvs().iter().map(Acv::location).collect();
        assert_eq!(locs, vec![10.0, 6.0, 1.0]);
        assert_eq!(f.gaps(), vec![4.0, 5.0]);
        assert_eq!(f.acvs()[1].total_penalty(), 1.0);
        assert_eq!(f.acvs()[2].total_penalty(), 0.0);
        assert_eq!(f.total_regret(), 0.5);
    }

    #[test]
    fn rejected_correction_moves_nobody() {
        let mut f = three();
        let before = f.clone();
        let out_of_range = Correction {
            arm: 2,
            speed_modifier: 0.0,
            penalty: 0.0,
            regret: 0.0,
        };
        assert!(matches!(
            f.advance(&out_of_range, 0.0),
            Err(Error::ArmOutOfRange { arm: 2, n_arms: 2 })
        ));
        let negative = Correction {
            arm: 1,
            speed_modifier: 0.0,
            penalty: -1.0,
            regret: 0.0,
        };
        assert!(f.advance(&negative, 0.0).is_err());
        assert_eq!(f, before);
    }

    #[test]
    fn live_fleet_honors_tick_budget() {
        let cfg = AcvsConfig {
            num_acvs: 4,
            ..AcvsConfig::default()
        };
        let sim = SimulationConfig {
            max_ticks: 3,
            lead_speed_jitter: 0.2,
            ..SimulationConfig::default()
        };
        let mut live = LiveFleet::from_config(&cfg, &sim, 9).unwrap();
        let mut n = 0;
        while let Some(s) = live.next_snapshot() {
            assert_eq!(s.distances.len(), 3);
            live.apply(&Correction {
                arm: 0,
                speed_modifier: 0.0,
                penalty: 0.0,
                regret: 0.0,
            })
            .unwrap();
            n += 1;
        }
        assert_eq!(n, 3);
        assert_eq!(live.ticks_emitted(), 3);
    }

    #[test]
    fn live_layout_gaps_stay_within_jitter() {
        let cfg = AcvsConfig::default();
        let live = LiveFleet::from_config(&cfg, &SimulationConfig::default(), 1).unwrap();
        for g in live.fleet().gaps() {
            assert!((g - cfg.ideal_distance).abs() <= cfg.initial_gap_jitter + 1e-12);
        }
    }
}
