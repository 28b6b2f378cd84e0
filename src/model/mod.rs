//! Domain records shared by the planner, ingest and export layers.

pub mod assignment;
pub mod case;
pub mod committee;
pub mod evaluator;

use serde::{Deserialize, Serialize};

pub use assignment::{Assignment, Panel, SlotPanels};
pub use case::Case;
pub use committee::Committee;
pub use evaluator::{Evaluator, EvaluatorPool, EvaluatorRecord};

/// A discrete time bucket. Slots are ordered by their input column position only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub index: usize,
    pub label: String,
}

impl Slot {
    pub fn new(index: usize, label: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
        }
    }

    /// Slots labelled `Slot 1..=count`, used when no header labels are available.
    pub fn numbered(count: usize) -> Vec<Slot> {
        (0..count)
            .map(|index| Slot::new(index, format!("Slot {}", index + 1)))
            .collect()
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}
