//! Monitor stage: entry point of every tick.
//!
//! Copies the subject's readings so nothing downstream aliases the subject's buffers,
//! stores speeds and locations in the knowledge store, and hands the distances on.
//! It does not check lengths against the arm count; the analyzer owns that check.

use crate::Knowledge;

#[derive(Debug, Clone, Default)]
pub struct Monitor {
    invocations: u64,
}

impl Monitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tick's readings and return the distances for analysis.
    pub fn update(
        &mut self,
        knowledge: &mut Knowledge,
        distances: &[f64],
        speeds: &[f64],
        locations: &[f64],
    ) -> Vec<f64> {
        self.invocations += 1;
        knowledge.record(speeds.to_vec(), locations.to_vec());
        distances.to_vec()
    }

    /// Ticks observed so far.
    pub fn invocations(&self) -> u64 {
        self.invocations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MabConfig, ModelKind};

    #[test]
    fn records_copies_and_counts() {
        let model = ModelKind::LinearUcb
            .build(2, &MabConfig::default(), 0)
            .unwrap();
        let mut k = Knowledge::new(5.0, model);
        let mut m = Monitor::new();

        let mut speeds = vec![1.0, 2.0, 3.0];
        let locations = vec![10.0, 6.0, 0.0];
        let d = m.update(&mut k, &[4.0, 6.0], &speeds, &locations);
        speeds[0] = 99.0;

        assert_eq!(d, vec![4.0, 6.0]);
        assert_eq!(k.starting_speeds(), &[1.0, 2.0, 3.0]);
        assert_eq!(k.locations(), &[10.0, 6.0, 0.0]);
        assert_eq!(m.invocations(), 1);

        m.update(&mut k, &[], &[], &[]);
        assert!(k.starting_speeds().is_empty());
        assert_eq!(m.invocations(), 2);
    }
}
