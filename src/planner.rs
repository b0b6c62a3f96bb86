//! Planner stage: ask the engine which trailing vehicle to correct.

use tracing::trace;

use crate::{Analysis, ContextualPolicy, Decision, Knowledge, Result};

/// What the executer acts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub decision: Decision,
    pub analysis: Analysis,
}

impl Plan {
    pub fn arm(&self) -> usize {
        self.decision.arm
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Planner;

impl Planner {
    pub fn execute(&self, analysis: Analysis, knowledge: &mut Knowledge) -> Result<Plan> {
        let decision = knowledge.model_mut().decide(&analysis.context)?;
        trace!(
            arm = decision.arm,
            tie_broken = decision.was_tie_broken(),
            notes = ?decision.notes,
            "planned"
        );
        Ok(Plan { decision, analysis })
    }
}
