//! Cross-group redistribution of cases toward `min_cases..=max_cases` per committee.
//!
//! Runs over the whole assignment at once:
//!
//! 1. committees holding fewer than `min_cases` cases hand them all to a
//!    floating pool, together with every case no committee holds; the pool is
//!    shuffled once;
//! 2. phase A tops up the remaining partially filled committees to `max_cases`;
//! 3. phase B refills the emptied committees to `min_cases`, smallest first;
//! 4. phase C lets committees still short take cases from full ones;
//! 5. whatever floats afterwards is returned as unplaced.
//!
//! Every move keeps the sponsor rule: a case never lands before a committee
//! that seats one of its sponsors.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::assignment::PanelRef;
use crate::model::{Assignment, Case, Panel};

#[derive(Debug, Clone, Copy)]
pub struct Rebalancer {
    min_cases: usize,
    max_cases: usize,
}

impl Default for Rebalancer {
    fn default() -> Self {
        Self::new(4, 6)
    }
}

/// Per-phase move counts, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebalanceSummary {
    pub pooled: usize,
    pub emptied_committees: usize,
    pub topped_up: usize,
    pub refilled: usize,
    pub moved_from_full: usize,
}

#[derive(Debug, Clone)]
pub struct RebalanceOutcome {
    pub assignment: Assignment,
    /// Cases left in the floating pool, in pool order.
    pub unplaced: Vec<Case>,
    pub summary: RebalanceSummary,
}

impl Rebalancer {
    pub fn new(min_cases: usize, max_cases: usize) -> Self {
        Self {
            min_cases,
            max_cases: max_cases.max(min_cases),
        }
    }

    pub fn rebalance<R: Rng + ?Sized>(
        &self,
        mut assignment: Assignment,
        universe: &[Case],
        rng: &mut R,
    ) -> RebalanceOutcome {
        let mut summary = RebalanceSummary::default();
        let all_refs = assignment.panel_refs();
        let active: Vec<PanelRef> = all_refs
            .iter()
            .copied()
            .filter(|&at| assignment.panel(at).is_some_and(Panel::is_active))
            .collect();

        let mut pool: Vec<Case> = Vec::new();

        // Cases parked on committees without members cannot stay there.
        for &at in &all_refs {
            if let Some(panel) = assignment.panel_mut(at) {
                if !panel.is_active() {
                    pool.append(&mut panel.cases);
                }
            }
        }

        let mut emptied: Vec<(PanelRef, usize)> = Vec::new();
        for &at in &active {
            if let Some(panel) = assignment.panel_mut(at) {
                if panel.len() < self.min_cases {
                    emptied.push((at, panel.len()));
                    pool.append(&mut panel.cases);
                }
            }
        }
        summary.emptied_committees = emptied.len();

        let mut known: HashSet<String> = assignment
            .placed_case_ids()
            .into_iter()
            .map(str::to_string)
            .collect();
        known.extend(pool.iter().map(|case| case.id.clone()));
        for case in universe {
            if known.insert(case.id.clone()) {
                pool.push(case.clone());
            }
        }
        summary.pooled = pool.len();
        pool.shuffle(rng);

        tracing::debug!(
            pooled = summary.pooled,
            emptied = summary.emptied_committees,
            "floating pool collected"
        );

        // Phase A: partially filled committees, least filled first.
        let mut partial: Vec<PanelRef> = active
            .iter()
            .copied()
            .filter(|&at| {
                let len = size_of(&assignment, at);
                len >= self.min_cases && len < self.max_cases
            })
            .collect();
        partial.sort_by_key(|&at| size_of(&assignment, at));
        for at in partial {
            summary.topped_up += fill_from_pool(&mut assignment, at, &mut pool, self.max_cases);
        }

        // Phase B: emptied committees, smallest original size first.
        emptied.sort_by_key(|&(_, before)| before);
        for &(at, _) in &emptied {
            summary.refilled += fill_from_pool(&mut assignment, at, &mut pool, self.min_cases);
        }

        // Phase C: committees still short pull from full ones.
        let mut short: Vec<PanelRef> = active
            .iter()
            .copied()
            .filter(|&at| size_of(&assignment, at) < self.min_cases)
            .collect();
        short.sort_by_key(|&at| size_of(&assignment, at));
        for destination in short {
            while size_of(&assignment, destination) < self.min_cases {
                let Some((donor, position)) = find_movable(&assignment, &active, destination, self.max_cases)
                else {
                    break;
                };
                let Some(case) = assignment
                    .panel_mut(donor)
                    .map(|panel| panel.cases.remove(position))
                else {
                    break;
                };
                if let Some(panel) = assignment.panel_mut(destination) {
                    panel.cases.push(case);
                    summary.moved_from_full += 1;
                }
            }
        }

        tracing::info!(
            event = "planner.rebalanced",
            pooled = summary.pooled,
            topped_up = summary.topped_up,
            refilled = summary.refilled,
            moved_from_full = summary.moved_from_full,
            unplaced = pool.len(),
        );

        RebalanceOutcome {
            assignment,
            unplaced: pool,
            summary,
        }
    }
}

fn size_of(assignment: &Assignment, at: PanelRef) -> usize {
    assignment.panel(at).map_or(0, Panel::len)
}

/// Moves conflict-free pool cases into the panel until it holds `target`.
/// A conflicting case is passed over, not retried.
fn fill_from_pool(assignment: &mut Assignment, at: PanelRef, pool: &mut Vec<Case>, target: usize) -> usize {
    let Some(panel) = assignment.panel_mut(at) else {
        return 0;
    };
    let mut moved = 0;
    let mut cursor = 0;
    while cursor < pool.len() && panel.len() < target {
        if panel.accepts(&pool[cursor]) {
            panel.cases.push(pool.remove(cursor));
            moved += 1;
        } else {
            cursor += 1;
        }
    }
    moved
}

/// First case, scanning full committees in input order, that the destination can take.
fn find_movable(
    assignment: &Assignment,
    active: &[PanelRef],
    destination: PanelRef,
    max_cases: usize,
) -> Option<(PanelRef, usize)> {
    let target = assignment.panel(destination)?;
    active
        .iter()
        .copied()
        .filter(|&at| at != destination)
        .filter_map(|at| assignment.panel(at).map(|panel| (at, panel)))
        .filter(|(_, panel)| panel.len() >= max_cases)
        .find_map(|(at, panel)| {
            panel
                .cases
                .iter()
                .position(|case| target.accepts(case))
                .map(|position| (at, position))
        })
}
