use serde::Serialize;

use crate::model::{Assignment, Panel};

/// Summary figures for one run. Committees without members are not counted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub total_committees: usize,
    /// Committees holding at least `min_cases` cases.
    pub optimal_committees: usize,
    pub empty_committees: usize,
    pub cases_placed: usize,
    /// Rounded to two decimals; zero when there are no committees.
    pub average_cases_per_committee: f64,
    pub total_cases: usize,
    pub unplaced_cases: usize,
}

impl RunStats {
    pub fn compute(assignment: &Assignment, min_cases: usize, total_cases: usize, unplaced_cases: usize) -> Self {
        let active: Vec<&Panel> = assignment.panels().filter(|panel| panel.is_active()).collect();
        let cases_placed: usize = active.iter().map(|panel| panel.len()).sum();
        let average = if active.is_empty() {
            0.0
        } else {
            round2(cases_placed as f64 / active.len() as f64)
        };

        Self {
            total_committees: active.len(),
            optimal_committees: active.iter().filter(|panel| panel.len() >= min_cases).count(),
            empty_committees: active.iter().filter(|panel| panel.is_empty()).count(),
            cases_placed,
            average_cases_per_committee: average,
            total_cases,
            unplaced_cases,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
