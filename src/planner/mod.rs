//! The planning engine: demand, committee formation, case assignment, rebalancing.
//!
//! One [`Engine`] performs one run. It owns the run's seeded generator, so two
//! engines built from the same configuration and fed the same input produce
//! identical reports.

pub mod case_assigner;
pub mod committee_builder;
pub mod demand;
pub mod rebalancer;
pub mod stats;
pub mod warnings;

use std::collections::{BTreeSet, HashSet};
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::model::{Assignment, Case, EvaluatorPool, EvaluatorRecord, Slot};

pub use case_assigner::CaseAssigner;
pub use committee_builder::{CommitteeBuilder, CommitteesBySlot};
pub use demand::{committees_needed, distribute};
pub use rebalancer::{RebalanceOutcome, RebalanceSummary, Rebalancer};
pub use stats::RunStats;
pub use warnings::{RunWarning, WarningLog};

/// Generator used for every random draw in a run.
pub type RunRng = ChaCha8Rng;

pub fn run_rng(seed: u64) -> RunRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Evaluators of one organizational group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupInput {
    pub name: String,
    pub evaluators: Vec<EvaluatorRecord>,
}

impl GroupInput {
    pub fn new(name: impl Into<String>, evaluators: Vec<EvaluatorRecord>) -> Self {
        Self {
            name: name.into(),
            evaluators,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanInput {
    /// Slot labels in column order. Empty means `Slot 1..=slot_count`.
    pub slots: Vec<Slot>,
    pub groups: Vec<GroupInput>,
    /// Cases already tagged with their group.
    pub cases: Vec<Case>,
    /// Cases no group could claim; reported, never placed.
    pub unrouted: Vec<Case>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub seed: u64,
    pub assignment: Assignment,
    pub stats: RunStats,
    pub warnings: Vec<RunWarning>,
    pub unplaced: Vec<Case>,
    pub unrouted: Vec<Case>,
    pub elapsed_ms: u64,
}

pub struct Engine {
    config: EngineConfig,
    rng: RunRng,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let rng = run_rng(config.seed);
        Self { config, rng }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn run(mut self, input: PlanInput) -> RunReport {
        let run_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("planner.run", run_id = %run_id, seed = self.config.seed);
        let _entered = span.enter();
        let started = Instant::now();

        let slots = if input.slots.is_empty() {
            Slot::numbered(self.config.slot_count)
        } else {
            input.slots
        };
        let mut warnings = WarningLog::default();
        for case in &input.unrouted {
            warnings.record(RunWarning::UnroutedCase {
                case_id: case.id.clone(),
            });
        }

        let mut seen: HashSet<String> = HashSet::new();
        let universe: Vec<Case> = input
            .cases
            .into_iter()
            .filter(|case| self.config.includes_group(&case.group))
            .filter(|case| {
                let first = seen.insert(case.id.clone());
                if !first {
                    tracing::warn!(case_id = %case.id, "duplicate case id ignored");
                }
                first
            })
            .collect();
        tracing::info!(
            slots = slots.len(),
            groups = input.groups.len(),
            cases = universe.len(),
            "run started"
        );

        let builder = CommitteeBuilder::new(self.config.committee_size)
            .with_partial_policy(self.config.partial_committees);
        let assigner = CaseAssigner::new(self.config.max_cases);
        let mut assignment = Assignment::with_slots(&slots);

        for group in input
            .groups
            .iter()
            .filter(|group| self.config.includes_group(&group.name))
        {
            let cases: Vec<Case> = universe
                .iter()
                .filter(|case| case.group == group.name)
                .cloned()
                .collect();
            if cases.is_empty() {
                warnings.record(RunWarning::DegenerateGroup {
                    group: group.name.clone(),
                    reason: "no cases".into(),
                });
                continue;
            }
            let mut pool = EvaluatorPool::from_records(&group.name, &group.evaluators);
            if pool.is_empty() {
                warnings.record(RunWarning::DegenerateGroup {
                    group: group.name.clone(),
                    reason: "no evaluators".into(),
                });
                continue;
            }

            let case_count = cases.len();
            let needed = committees_needed(case_count, self.config.max_cases);
            let per_slot = distribute(needed, slots.len());
            let committees = builder.build(&mut pool, &slots, &per_slot, &mut self.rng, &mut warnings);
            let formed: usize = committees.iter().map(Vec::len).sum();
            let (group_assignment, left) = assigner.assign(&slots, committees, cases);
            tracing::info!(
                group = %group.name,
                cases = case_count,
                committees_needed = needed,
                committees_formed = formed,
                left_over = left.len(),
                "group planned"
            );
            assignment.merge(group_assignment);
        }

        // Cases whose group has no evaluator sheet still float into the shared pool.
        let known: BTreeSet<&str> = input.groups.iter().map(|group| group.name.as_str()).collect();
        let orphaned: BTreeSet<&str> = universe
            .iter()
            .map(|case| case.group.as_str())
            .filter(|group| !known.contains(group))
            .collect();
        for group in orphaned {
            warnings.record(RunWarning::DegenerateGroup {
                group: group.to_string(),
                reason: "no evaluators".into(),
            });
        }

        let RebalanceOutcome {
            assignment,
            unplaced,
            ..
        } = Rebalancer::new(self.config.min_cases, self.config.max_cases).rebalance(
            assignment,
            &universe,
            &mut self.rng,
        );
        for case in &unplaced {
            warnings.record(RunWarning::UnplacedCase {
                case_id: case.id.clone(),
                group: case.group.clone(),
            });
        }

        let stats = RunStats::compute(&assignment, self.config.min_cases, universe.len(), unplaced.len());
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            event = "planner.completed",
            committees = stats.total_committees,
            placed = stats.cases_placed,
            unplaced = stats.unplaced_cases,
            warnings = warnings.len(),
            elapsed_ms,
        );

        RunReport {
            run_id,
            seed: self.config.seed,
            assignment,
            stats,
            warnings: warnings.into_inner(),
            unplaced,
            unrouted: input.unrouted,
            elapsed_ms,
        }
    }
}
