//! Soft outcomes of a run. None of these abort planning; they are logged and returned to the caller.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunWarning {
    /// Fewer evaluators are available in a slot than its committees need.
    CapacityShortfall {
        group: String,
        slot: String,
        available: usize,
        needed: usize,
    },
    /// Seats left empty after the evaluator pool ran dry for a slot.
    UnmetDemand {
        group: String,
        slot: String,
        unmet: usize,
    },
    /// A committee with fewer than the configured number of members.
    PartialCommittee {
        group: String,
        slot: String,
        members: usize,
        kept: bool,
    },
    /// A group that produced no committees (no cases or no evaluators).
    DegenerateGroup { group: String, reason: String },
    /// A case left in the floating pool after rebalancing.
    UnplacedCase { case_id: String, group: String },
    /// A case whose sponsors match no evaluator of any group.
    UnroutedCase { case_id: String },
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityShortfall {
                group,
                slot,
                available,
                needed,
            } => write!(
                f,
                "{group} / {slot}: {available} evaluators available, {needed} needed"
            ),
            Self::UnmetDemand { group, slot, unmet } => {
                write!(f, "{group} / {slot}: {unmet} seat(s) left unfilled")
            }
            Self::PartialCommittee {
                group,
                slot,
                members,
                kept,
            } => write!(
                f,
                "{group} / {slot}: committee with {members} member(s) {}",
                if *kept { "kept" } else { "dropped" }
            ),
            Self::DegenerateGroup { group, reason } => write!(f, "{group}: skipped, {reason}"),
            Self::UnplacedCase { case_id, group } => {
                write!(f, "case {case_id} ({group}) could not be placed")
            }
            Self::UnroutedCase { case_id } => {
                write!(f, "case {case_id} has no sponsor belonging to a known group")
            }
        }
    }
}

/// Collects warnings and mirrors each one to the log as it is recorded.
#[derive(Debug, Clone, Default)]
pub struct WarningLog {
    items: Vec<RunWarning>,
}

impl WarningLog {
    pub fn record(&mut self, warning: RunWarning) {
        tracing::warn!(event = "planner.warning", "{warning}");
        self.items.push(warning);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RunWarning> {
        self.items.iter()
    }

    pub fn into_inner(self) -> Vec<RunWarning> {
        self.items
    }
}
