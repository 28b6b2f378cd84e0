//! First-fit case allocation within one organizational group.

use crate::model::{Assignment, Case, Panel, Slot};
use crate::planner::committee_builder::CommitteesBySlot;

#[derive(Debug, Clone, Copy)]
pub struct CaseAssigner {
    capacity: usize,
}

impl Default for CaseAssigner {
    fn default() -> Self {
        Self { capacity: 6 }
    }
}

impl CaseAssigner {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Fills committees slot by slot, in input order, from `cases`.
    ///
    /// Each committee scans the remaining cases in order, skipping those
    /// sponsored by one of its members, until it holds `capacity` cases.
    /// A skipped case stays available to later committees. Returns the
    /// group's assignment and the cases nobody took.
    pub fn assign(
        &self,
        slots: &[Slot],
        committees: CommitteesBySlot,
        cases: Vec<Case>,
    ) -> (Assignment, Vec<Case>) {
        let mut remaining = cases;
        let mut assignment = Assignment::with_slots(slots);

        for (slot, slot_committees) in committees.into_iter().enumerate() {
            let mut panels = Vec::with_capacity(slot_committees.len());
            for committee in slot_committees {
                let mut panel = Panel::new(committee);
                if !panel.is_active() {
                    tracing::debug!(slot, "committee without members receives no cases");
                    panels.push(panel);
                    continue;
                }
                let mut cursor = 0;
                while cursor < remaining.len() && panel.len() < self.capacity {
                    if panel.accepts(&remaining[cursor]) {
                        panel.cases.push(remaining.remove(cursor));
                    } else {
                        cursor += 1;
                    }
                }
                panels.push(panel);
            }
            assignment.extend_slot(slot, panels);
        }

        (assignment, remaining)
    }
}
