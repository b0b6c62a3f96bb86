//! Recorded platoon traces and their playback subject.
//!
//! A trace is JSON:
//!
//! ```json
//! { "ticks": [ { "locations": [20.0, 14.0, 9.0], "speeds": [1.0, 1.0, 1.2] } ] }
//! ```
//!
//! Vehicle 0 is the lead. Playback overwrites the fleet's kinematics from each frame,
//! so corrections only affect the penalty and regret totals. The run ends when the
//! frames run out.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Correction, Error, Fleet, Result, Snapshot, Subject};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    pub locations: Vec<f64>,
    pub speeds: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub ticks: Vec<TraceFrame>,
}

impl Trace {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let trace: Trace = serde_json::from_str(s)?;
        trace.validate()?;
        Ok(trace)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Number of vehicles, taken from the first frame.
    pub fn num_acvs(&self) -> Option<usize> {
        self.ticks.first().map(|f| f.locations.len())
    }

    /// All frames must agree on the vehicle count (>= 2) and hold finite values.
    pub fn validate(&self) -> Result<()> {
        let Some(n) = self.num_acvs() else {
            return Ok(());
        };
        if n < 2 {
            return Err(Error::InvalidTrace {
                tick: 0,
                reason: format!("need a lead and at least one follower, got {n} vehicles"),
            });
        }
        for (tick, f) in self.ticks.iter().enumerate() {
            if f.locations.len() != n || f.speeds.len() != n {
                return Err(Error::InvalidTrace {
                    tick,
                    reason: format!(
                        "expected {n} locations and speeds, got {} and {}",
                        f.locations.len(),
                        f.speeds.len()
                    ),
                });
            }
            if f.locations.iter().chain(f.speeds.iter()).any(|v| !v.is_finite()) {
                return Err(Error::InvalidTrace {
                    tick,
                    reason: "non-finite value".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Replays a [`Trace`] through the control loop.
#[derive(Debug, Clone)]
pub struct TracePlayback {
    fleet: Fleet,
    frames: Vec<TraceFrame>,
    cursor: usize,
    max_ticks: u64,
}

impl TracePlayback {
    /// Playback for a platoon of `num_acvs` vehicles.
    ///
    /// `max_ticks` caps playback below the trace length when smaller. A trace
    /// without frames is already exhausted: the fleet is parked at the origin and
    /// the first `next_snapshot` returns `None`.
    pub fn new(trace: Trace, num_acvs: usize, max_ticks: u64) -> Result<Self> {
        trace.validate()?;
        let fleet = match trace.ticks.first() {
            Some(first) => {
                if first.locations.len() != num_acvs {
                    return Err(Error::ShapeMismatch {
                        what: "trace vehicles vs acvs.num_acvs",
                        got: first.locations.len(),
                        expected: num_acvs,
                    });
                }
                Fleet::from_kinematics(&first.locations, &first.speeds)?
            }
            None => {
                let parked = vec![0.0; num_acvs];
                Fleet::from_kinematics(&parked, &parked)?
            }
        };
        Ok(Self {
            fleet,
            frames: trace.ticks,
            cursor: 0,
            max_ticks,
        })
    }

    pub fn frames_played(&self) -> usize {
        self.cursor
    }
}

impl Subject for TracePlayback {
    fn next_snapshot(&mut self) -> Option<Snapshot> {
        if self.cursor as u64 >= self.max_ticks {
            return None;
        }
        let frame = self.frames.get(self.cursor)?;
        if let Err(e) = self.fleet.sync(&frame.locations, &frame.speeds) {
            // Frames are validated up front; a failure here means the fleet changed shape.
            warn!(tick = self.cursor, error = %e, "trace frame rejected, ending playback");
            return None;
        }
        self.cursor += 1;
        Some(self.fleet.snapshot())
    }

    fn apply(&mut self, correction: &Correction) -> Result<()> {
        self.fleet.advance(correction, 0.0)
    }

    fn fleet(&self) -> &Fleet {
        &self.fleet
    }
}
