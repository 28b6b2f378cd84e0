use serde::Serialize;

use crate::model::Case;

/// A panel of evaluators sitting in one slot.
///
/// Members keep placement order so iteration is reproducible; equality ignores order.
#[derive(Debug, Clone, Eq, Serialize)]
pub struct Committee {
    pub slot: usize,
    pub group: String,
    members: Vec<String>,
}

impl Committee {
    pub fn new(slot: usize, group: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            slot,
            group: group.into(),
            members,
        }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, evaluator: &str) -> bool {
        self.members.iter().any(|member| member == evaluator)
    }

    /// True when one of the case's sponsors sits on this committee.
    pub fn conflicts_with(&self, case: &Case) -> bool {
        case.sponsors.iter().any(|sponsor| self.contains(sponsor))
    }
}

impl PartialEq for Committee {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
            && self.group == other.group
            && self.members.len() == other.members.len()
            && self.members.iter().all(|member| other.contains(member))
    }
}
