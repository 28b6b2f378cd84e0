//! End-to-end run: workbooks in, [`RunReport`] out.

use std::path::Path;

use thiserror::Error;

use crate::config::{ConfigError, EngineConfig, RunConfig};
use crate::data::availability::load_groups;
use crate::data::cases::{load_cases, route_cases};
use crate::data::workbook::{IngestError, Workbook};
use crate::planner::{Engine, PlanInput, RunReport};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("availability workbook contains no group sheets")]
    NoGroups,
}

/// Runs the engine on an already assembled input.
pub fn run_plan(input: PlanInput, config: &EngineConfig) -> RunReport {
    Engine::new(config.clone()).run(input)
}

pub fn run_workbooks(
    availability: &Workbook,
    cases: &Workbook,
    config: &RunConfig,
) -> Result<RunReport, PipelineError> {
    config.validate()?;
    let book = load_groups(availability, &config.availability, config.engine.slot_count);
    if book.groups.is_empty() {
        return Err(PipelineError::NoGroups);
    }
    let routed = route_cases(load_cases(cases, &config.cases)?, &book);
    let input = PlanInput {
        slots: book.slots,
        groups: book.groups,
        cases: routed.routed,
        unrouted: routed.unrouted,
    };
    Ok(run_plan(input, &config.engine))
}

pub fn run_paths(
    availability: impl AsRef<Path>,
    cases: impl AsRef<Path>,
    config: &RunConfig,
) -> Result<RunReport, PipelineError> {
    let availability = Workbook::open(availability)?;
    let cases = Workbook::open(cases)?;
    run_workbooks(&availability, &cases, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::workbook::Sheet;

    fn availability() -> Workbook {
        let header = |cells: [&'static str; 6]| cells.to_vec();
        let mut rows = vec![
            header(["", "", "", "", "Mon", "Tue"]),
            header(["", "", "", "", "AM", "AM"]),
            header(["Name", "Email", "Times", "Weight", "", ""]),
        ];
        for i in 0..6 {
            rows.push(vec!["n", ["a@x", "b@x", "c@x", "d@x", "e@x", "f@x"][i], "0", "0", "Sí", "Sí"]);
        }
        Workbook::new(vec![Sheet::from_strings("Math", &rows), Sheet::from_strings("Totals", &[vec!["-"]])])
    }

    fn cases() -> Workbook {
        let ids: Vec<String> = (0..8).map(|i| format!("T{i}")).collect();
        let mut rows = vec![vec!["e", "id", "name", "", "", "", "tutors", "degree"]];
        for id in &ids {
            rows.push(vec!["1", id.as_str(), "Student", "", "", "", "a@x(A)", "GII"]);
        }
        rows.push(vec!["1", "X", "Outsider", "", "", "", "zz@y(Z)", "GII"]);
        Workbook::new(vec![Sheet::from_strings("cases", &rows)])
    }

    #[test]
    fn workbooks_to_report() {
        let mut config = RunConfig::default();
        config.engine.slot_count = 2;
        let report = run_workbooks(&availability(), &cases(), &config).expect("run succeeds");

        assert_eq!(report.stats.total_cases, 8);
        assert_eq!(report.unrouted.len(), 1);
        assert_eq!(report.assignment.slots()[0].slot.label, "Mon / AM");
        for panel in report.assignment.panels() {
            assert!(!panel.committee.contains("a@x") || panel.is_empty());
        }
        assert_eq!(report.stats.cases_placed + report.stats.unplaced_cases, 8);
    }

    #[test]
    fn availability_without_groups_is_rejected() {
        let only_summary = Workbook::new(vec![Sheet::from_strings("Totals", &[vec!["-"]])]);
        assert!(matches!(
            run_workbooks(&only_summary, &cases(), &RunConfig::default()),
            Err(PipelineError::NoGroups)
        ));
    }
}
