//! Synthetic planning scenarios for demos, benchmarks and property tests.
//!
//! Generates evaluators with random availability and cases sponsored by
//! evaluators of their own group, sometimes with an outside co-sponsor.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::model::{Case, EvaluatorRecord, Slot};
use crate::planner::{GroupInput, PlanInput};

/// Shape of a generated scenario.
#[derive(Debug, Clone)]
pub struct ScenarioSpec {
    pub groups: usize,
    pub evaluators_per_group: usize,
    pub cases_per_group: usize,
    pub slots: usize,
    /// Probability that an evaluator is available in a given slot.
    pub availability: f64,
    /// Probability that a case has a second sponsor from another group.
    pub co_sponsored: f64,
    /// Past participation counts are drawn from `0..=max_participation`.
    pub max_participation: u32,
    pub categories: Vec<String>,
}

impl Default for ScenarioSpec {
    fn default() -> Self {
        Self {
            groups: 4,
            evaluators_per_group: 12,
            cases_per_group: 20,
            slots: 6,
            availability: 0.6,
            co_sponsored: 0.2,
            max_participation: 3,
            categories: vec!["GII".to_string(), "GIC".to_string(), "GMI".to_string()],
        }
    }
}

impl ScenarioSpec {
    /// A single small group, handy in tests.
    pub fn small() -> Self {
        Self {
            groups: 1,
            evaluators_per_group: 9,
            cases_per_group: 10,
            ..Self::default()
        }
    }

    /// Roughly the size of a real faculty session.
    pub fn large() -> Self {
        Self {
            groups: 10,
            evaluators_per_group: 30,
            cases_per_group: 60,
            ..Self::default()
        }
    }
}

pub struct ScenarioGenerator {
    spec: ScenarioSpec,
    rng: ChaCha8Rng,
}

impl ScenarioGenerator {
    pub fn new(spec: ScenarioSpec, seed: u64) -> Self {
        Self {
            spec,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn generate(&mut self) -> PlanInput {
        let groups: Vec<GroupInput> = (0..self.spec.groups)
            .map(|g| GroupInput::new(group_name(g), self.generate_evaluators(g)))
            .collect();
        let cases = self.generate_cases(&groups);
        PlanInput {
            slots: Slot::numbered(self.spec.slots),
            groups,
            cases,
            unrouted: Vec::new(),
        }
    }

    fn generate_evaluators(&mut self, group: usize) -> Vec<EvaluatorRecord> {
        let availability = self.spec.availability.clamp(0.0, 1.0);
        (0..self.spec.evaluators_per_group)
            .map(|i| {
                let mut available: Vec<bool> = (0..self.spec.slots)
                    .map(|_| self.rng.random_bool(availability))
                    .collect();
                // Nobody signs up for zero slots.
                if !available.is_empty() && !available.contains(&true) {
                    let slot = self.rng.random_range(0..available.len());
                    available[slot] = true;
                }
                EvaluatorRecord::new(
                    format!("eval{i:02}@{}.example", group_name(group).to_lowercase()),
                    self.rng.random_range(0..=self.spec.max_participation),
                    (self.rng.random_range(0.0..1.0f64) * 10.0).round() / 10.0,
                    available,
                )
            })
            .collect()
    }

    fn generate_cases(&mut self, groups: &[GroupInput]) -> Vec<Case> {
        let co_sponsored = self.spec.co_sponsored.clamp(0.0, 1.0);
        let mut cases = Vec::with_capacity(groups.len() * self.spec.cases_per_group);
        for (g, group) in groups.iter().enumerate() {
            for i in 0..self.spec.cases_per_group {
                let mut sponsors = Vec::with_capacity(2);
                if let Some(primary) = group.evaluators.choose(&mut self.rng) {
                    sponsors.push(primary.id.clone());
                }
                if groups.len() > 1 && self.rng.random_bool(co_sponsored) {
                    let other = (g + self.rng.random_range(1..groups.len())) % groups.len();
                    if let Some(second) = groups[other].evaluators.choose(&mut self.rng) {
                        sponsors.push(second.id.clone());
                    }
                }
                let category = self
                    .spec
                    .categories
                    .choose(&mut self.rng)
                    .cloned()
                    .unwrap_or_else(|| "General".to_string());
                cases.push(Case::new(
                    format!("{}-{:03}", group.name, i + 1),
                    format!("Project {} of {}", i + 1, group.name),
                    group.name.clone(),
                    category,
                    sponsors,
                ));
            }
        }
        cases
    }
}

/// One-shot convenience over [`ScenarioGenerator`].
pub fn generate(spec: &ScenarioSpec, seed: u64) -> PlanInput {
    ScenarioGenerator::new(spec.clone(), seed).generate()
}

fn group_name(index: usize) -> String {
    const NAMES: [&str; 8] = [
        "Algebra", "Biology", "Chemistry", "Design", "Economics", "Physics", "Geology", "History",
    ];
    NAMES
        .get(index)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("Group{index}"))
}
