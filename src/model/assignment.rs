//! The slot → committees → cases structure threaded through assignment and rebalancing.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::{Case, Committee, Slot};

/// A committee together with the cases it judges, in assignment order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub committee: Committee,
    pub cases: Vec<Case>,
}

impl Panel {
    pub fn new(committee: Committee) -> Self {
        Self {
            committee,
            cases: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// A panel without evaluators takes no part in assignment or statistics.
    pub fn is_active(&self) -> bool {
        !self.committee.is_empty()
    }

    /// True when the case can sit in front of this committee.
    pub fn accepts(&self, case: &Case) -> bool {
        self.is_active() && !self.committee.conflicts_with(case)
    }

    pub fn contains_case(&self, case_id: &str) -> bool {
        self.cases.iter().any(|case| case.id == case_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotPanels {
    pub slot: Slot,
    pub panels: Vec<Panel>,
}

/// Address of a panel inside an [`Assignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PanelRef {
    pub slot: usize,
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Assignment {
    slots: Vec<SlotPanels>,
}

impl Assignment {
    /// Empty assignment with one entry per slot, in slot order.
    pub fn with_slots(slots: &[Slot]) -> Self {
        Self {
            slots: slots
                .iter()
                .cloned()
                .map(|slot| SlotPanels {
                    slot,
                    panels: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn slots(&self) -> &[SlotPanels] {
        &self.slots
    }

    /// Appends panels to the slot at position `slot`. Out-of-range slots are ignored.
    pub fn extend_slot(&mut self, slot: usize, panels: impl IntoIterator<Item = Panel>) {
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.panels.extend(panels);
        }
    }

    /// Appends every slot of `other` to the matching slot of `self`.
    pub fn merge(&mut self, other: Assignment) {
        for (position, entry) in other.slots.into_iter().enumerate() {
            self.extend_slot(position, entry.panels);
        }
    }

    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.slots.iter().flat_map(|entry| entry.panels.iter())
    }

    /// Every panel address in input order: slot order, then position within the slot.
    pub fn panel_refs(&self) -> Vec<PanelRef> {
        self.slots
            .iter()
            .enumerate()
            .flat_map(|(slot, entry)| (0..entry.panels.len()).map(move |index| PanelRef { slot, index }))
            .collect()
    }

    pub fn panel(&self, at: PanelRef) -> Option<&Panel> {
        self.slots.get(at.slot)?.panels.get(at.index)
    }

    pub fn panel_mut(&mut self, at: PanelRef) -> Option<&mut Panel> {
        self.slots.get_mut(at.slot)?.panels.get_mut(at.index)
    }

    pub fn placed_case_ids(&self) -> HashSet<&str> {
        self.panels()
            .flat_map(|panel| panel.cases.iter().map(|case| case.id.as_str()))
            .collect()
    }

    pub fn case_count(&self) -> usize {
        self.panels().map(Panel::len).sum()
    }

    /// Slot label and 1-based committee number of the panel holding `case_id`.
    pub fn locate(&self, case_id: &str) -> Option<(&Slot, usize)> {
        self.slots.iter().find_map(|entry| {
            entry
                .panels
                .iter()
                .position(|panel| panel.contains_case(case_id))
                .map(|position| (&entry.slot, position + 1))
        })
    }
}
