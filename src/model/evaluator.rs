//! Availability model: evaluators of one organizational group and the slots they can attend.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One input row of the availability table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorRecord {
    pub id: String,
    /// Number of committees this person already sat on in earlier sessions.
    pub participation: u32,
    /// Externally supplied weight added to the load score.
    pub weight: f64,
    /// Availability per slot, indexed by slot position.
    pub available: Vec<bool>,
}

impl EvaluatorRecord {
    pub fn new(id: impl Into<String>, participation: u32, weight: f64, available: Vec<bool>) -> Self {
        Self {
            id: id.into(),
            participation,
            weight,
            available,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluator {
    pub id: String,
    pub group: String,
    pub participation: u32,
    pub weight: f64,
    /// Tie-break score: participation + weight, plus one per committee placement.
    pub load: f64,
    available: BTreeSet<usize>,
    retired: bool,
}

impl Evaluator {
    pub fn from_record(group: &str, record: &EvaluatorRecord) -> Self {
        let available = record
            .available
            .iter()
            .enumerate()
            .filter_map(|(slot, &yes)| yes.then_some(slot))
            .collect();
        Self {
            id: record.id.clone(),
            group: group.to_string(),
            participation: record.participation,
            weight: record.weight,
            load: f64::from(record.participation) + record.weight,
            available,
            retired: false,
        }
    }

    pub fn is_available(&self, slot: usize) -> bool {
        !self.retired && self.available.contains(&slot)
    }

    /// Number of slots this evaluator can still be placed in.
    pub fn remaining_slots(&self) -> usize {
        if self.retired {
            0
        } else {
            self.available.len()
        }
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }
}

/// Index-addressable evaluator collection for one group.
///
/// Evaluators are never removed; placing one retires it, which clears its
/// availability. Iteration order is the input row order.
#[derive(Debug, Clone, Default)]
pub struct EvaluatorPool {
    group: String,
    evaluators: Vec<Evaluator>,
}

impl EvaluatorPool {
    pub fn from_records(group: &str, records: &[EvaluatorRecord]) -> Self {
        let mut evaluators: Vec<Evaluator> = Vec::with_capacity(records.len());
        for record in records {
            if evaluators.iter().any(|existing| existing.id == record.id) {
                tracing::warn!(group = %group, evaluator = %record.id, "duplicate evaluator row ignored");
                continue;
            }
            evaluators.push(Evaluator::from_record(group, record));
        }
        Self {
            group: group.to_string(),
            evaluators,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }

    pub fn evaluators(&self) -> &[Evaluator] {
        &self.evaluators
    }

    pub fn get(&self, index: usize) -> Option<&Evaluator> {
        self.evaluators.get(index)
    }

    pub fn find(&self, id: &str) -> Option<&Evaluator> {
        self.evaluators.iter().find(|evaluator| evaluator.id == id)
    }

    /// True while at least one evaluator has not been placed.
    pub fn has_active(&self) -> bool {
        self.evaluators.iter().any(|evaluator| !evaluator.retired)
    }

    /// Count of unplaced evaluators available in `slot`.
    pub fn available_in(&self, slot: usize) -> usize {
        self.evaluators
            .iter()
            .filter(|evaluator| evaluator.is_available(slot))
            .count()
    }

    /// Indices of unplaced evaluators available in `slot`, in input order.
    pub fn candidates_in(&self, slot: usize) -> Vec<usize> {
        self.evaluators
            .iter()
            .enumerate()
            .filter(|(_, evaluator)| evaluator.is_available(slot))
            .map(|(index, _)| index)
            .collect()
    }

    /// Places the evaluator: bumps its load and takes it out of every slot.
    pub(crate) fn retire(&mut self, index: usize) -> Option<&Evaluator> {
        let evaluator = self.evaluators.get_mut(index)?;
        evaluator.load += 1.0;
        evaluator.available.clear();
        evaluator.retired = true;
        Some(evaluator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> EvaluatorPool {
        EvaluatorPool::from_records(
            "math",
            &[
                EvaluatorRecord::new("a@x", 2, 0.5, vec![true, false, true]),
                EvaluatorRecord::new("b@x", 0, 0.0, vec![false, true, true]),
                EvaluatorRecord::new("a@x", 9, 9.0, vec![true, true, true]),
            ],
        )
    }

    #[test]
    fn load_starts_at_participation_plus_weight() {
        let pool = pool();
        assert_eq!(pool.find("a@x").map(|e| e.load), Some(2.5));
        assert_eq!(pool.find("b@x").map(|e| e.load), Some(0.0));
    }

    #[test]
    fn duplicate_ids_keep_first_row() {
        let pool = pool();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.find("a@x").map(|e| e.participation), Some(2));
    }

    #[test]
    fn retire_clears_availability_and_bumps_load() {
        let mut pool = pool();
        assert_eq!(pool.available_in(2), 2);
        pool.retire(0);
        let a = pool.get(0).expect("evaluator a");
        assert!(a.is_retired());
        assert_eq!(a.remaining_slots(), 0);
        assert_eq!(a.load, 3.5);
        assert_eq!(pool.available_in(2), 1);
        assert_eq!(pool.candidates_in(2), vec![1]);
        assert!(pool.has_active());
        pool.retire(1);
        assert!(!pool.has_active());
    }
}
