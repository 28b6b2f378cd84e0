//! Greedy committee formation.
//!
//! Seats are filled one evaluator at a time. The slot with the least slack
//! (available minus still needed) is served first; within it the evaluator
//! with the lowest load wins, then the one available in the fewest slots.
//! Remaining ties are broken with the run's generator.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::config::PartialCommitteePolicy;
use crate::model::{Committee, EvaluatorPool, Slot};
use crate::planner::warnings::{RunWarning, WarningLog};

/// Committees per slot position.
pub type CommitteesBySlot = Vec<Vec<Committee>>;

#[derive(Debug, Clone)]
pub struct CommitteeBuilder {
    committee_size: usize,
    partial_policy: PartialCommitteePolicy,
}

impl CommitteeBuilder {
    pub fn new(committee_size: usize) -> Self {
        Self {
            committee_size: committee_size.max(1),
            partial_policy: PartialCommitteePolicy::default(),
        }
    }

    pub fn with_partial_policy(mut self, policy: PartialCommitteePolicy) -> Self {
        self.partial_policy = policy;
        self
    }

    pub fn committee_size(&self) -> usize {
        self.committee_size
    }

    /// Forms committees for one group.
    ///
    /// `committees_per_slot[i]` is the number of committees wanted in `slots[i]`;
    /// evaluator availability is indexed by the same slot position. Placed
    /// evaluators are retired from `pool` with their load bumped by one.
    pub fn build<R: Rng + ?Sized>(
        &self,
        pool: &mut EvaluatorPool,
        slots: &[Slot],
        committees_per_slot: &[usize],
        rng: &mut R,
        warnings: &mut WarningLog,
    ) -> CommitteesBySlot {
        let group = pool.group().to_string();
        let mut need: Vec<usize> = (0..slots.len())
            .map(|slot| self.committee_size * committees_per_slot.get(slot).copied().unwrap_or(0))
            .collect();

        for (slot, label) in slots.iter().enumerate() {
            let available = pool.available_in(slot);
            if need[slot] > available {
                warnings.record(RunWarning::CapacityShortfall {
                    group: group.clone(),
                    slot: label.label.clone(),
                    available,
                    needed: need[slot],
                });
            }
        }

        let mut seated: Vec<Vec<String>> = vec![Vec::new(); slots.len()];
        let mut open: Vec<usize> = (0..slots.len()).filter(|&slot| need[slot] > 0).collect();

        while !open.is_empty() && pool.has_active() {
            let slack: Vec<i64> = open
                .iter()
                .map(|&slot| pool.available_in(slot) as i64 - need[slot] as i64)
                .collect();
            let Some(&tightest) = slack.iter().min() else {
                break;
            };
            let critical: Vec<usize> = open
                .iter()
                .zip(&slack)
                .filter(|(_, &s)| s == tightest)
                .map(|(&slot, _)| slot)
                .collect();
            let Some(&slot) = critical.choose(rng) else {
                break;
            };

            let candidates = pool.candidates_in(slot);
            let Some(chosen) = pick_evaluator(pool, &candidates, rng) else {
                warnings.record(RunWarning::UnmetDemand {
                    group: group.clone(),
                    slot: slots[slot].label.clone(),
                    unmet: need[slot],
                });
                open.retain(|&s| s != slot);
                continue;
            };

            if let Some(evaluator) = pool.retire(chosen) {
                tracing::trace!(group = %group, slot = %slots[slot], evaluator = %evaluator.id, load = evaluator.load, "seated");
                seated[slot].push(evaluator.id.clone());
            }
            need[slot] -= 1;
            if need[slot] == 0 {
                open.retain(|&s| s != slot);
            }
        }

        for &slot in &open {
            warnings.record(RunWarning::UnmetDemand {
                group: group.clone(),
                slot: slots[slot].label.clone(),
                unmet: need[slot],
            });
        }

        seated
            .into_iter()
            .enumerate()
            .map(|(slot, members)| self.chunk(&group, slot, &slots[slot], members, warnings))
            .collect()
    }

    /// Splits a slot's seated evaluators into committees in seating order.
    fn chunk(
        &self,
        group: &str,
        slot: usize,
        label: &Slot,
        members: Vec<String>,
        warnings: &mut WarningLog,
    ) -> Vec<Committee> {
        let mut committees = Vec::with_capacity(members.len() / self.committee_size + 1);
        for chunk in members.chunks(self.committee_size) {
            if chunk.len() < self.committee_size {
                let kept = self.partial_policy == PartialCommitteePolicy::Keep;
                warnings.record(RunWarning::PartialCommittee {
                    group: group.to_string(),
                    slot: label.label.clone(),
                    members: chunk.len(),
                    kept,
                });
                if !kept {
                    continue;
                }
            }
            committees.push(Committee::new(slot, group, chunk.to_vec()));
        }
        committees
    }
}

/// Lowest load first, then scarcest availability, then a random draw.
fn pick_evaluator<R: Rng + ?Sized>(
    pool: &EvaluatorPool,
    candidates: &[usize],
    rng: &mut R,
) -> Option<usize> {
    let evaluators = pool.evaluators();
    let min_load = candidates
        .iter()
        .map(|&i| evaluators[i].load)
        .min_by(f64::total_cmp)?;
    let lightest: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|&i| evaluators[i].load.total_cmp(&min_load).is_eq())
        .collect();

    let min_remaining = lightest
        .iter()
        .map(|&i| evaluators[i].remaining_slots())
        .min()?;
    let scarcest: Vec<usize> = lightest
        .into_iter()
        .filter(|&i| evaluators[i].remaining_slots() == min_remaining)
        .collect();

    scarcest.choose(rng).copied()
}
