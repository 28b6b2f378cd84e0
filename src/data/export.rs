//! Result files: one `;`-separated CSV per category, plus stats and warnings.
//!
//! CSVs start with a UTF-8 byte order mark so spreadsheet tools in locales
//! that use `,` as decimal separator open them with the right encoding and
//! columns.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::model::Case;
use crate::planner::RunReport;

const BOM: &[u8] = b"\xEF\xBB\xBF";

pub const STATS_FILE: &str = "stats.json";
pub const WARNINGS_FILE: &str = "warnings.json";
pub const UNPLACED_FILE: &str = "unplaced.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// A named file produced by an export, not yet written anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize)]
struct AssignmentRow<'a> {
    category: &'a str,
    case_id: &'a str,
    name: &'a str,
    case_group: &'a str,
    slot: &'a str,
    /// 1-based position of the committee within its slot.
    committee: usize,
    evaluators: String,
    sponsors: String,
}

#[derive(Debug, Serialize)]
struct UnplacedRow<'a> {
    category: &'a str,
    case_id: &'a str,
    name: &'a str,
    case_group: &'a str,
    sponsors: String,
}

/// `assignments_<category>.csv` for every category with at least one placed case,
/// in file name order.
///
/// Categories that sanitise to the same file name share one file; each row
/// keeps its own category.
pub fn category_csvs(report: &RunReport) -> Result<Vec<ExportFile>, ExportError> {
    let mut by_file: BTreeMap<String, Vec<AssignmentRow<'_>>> = BTreeMap::new();
    for entry in report.assignment.slots() {
        for (index, panel) in entry.panels.iter().enumerate() {
            let evaluators = panel.committee.members().join(", ");
            for case in &panel.cases {
                by_file.entry(file_safe(&case.category)).or_default().push(AssignmentRow {
                    category: &case.category,
                    case_id: &case.id,
                    name: &case.name,
                    case_group: &case.group,
                    slot: &entry.slot.label,
                    committee: index + 1,
                    evaluators: evaluators.clone(),
                    sponsors: case.sponsors.join(", "),
                });
            }
        }
    }

    by_file
        .into_iter()
        .map(|(stem, rows)| {
            Ok(ExportFile {
                name: format!("assignments_{stem}.csv"),
                bytes: to_csv(&rows)?,
            })
        })
        .collect()
}

/// Residual and unrouted cases, or `None` when every case was placed.
pub fn unplaced_csv(report: &RunReport) -> Result<Option<ExportFile>, ExportError> {
    if report.unplaced.is_empty() && report.unrouted.is_empty() {
        return Ok(None);
    }
    let rows: Vec<UnplacedRow<'_>> = report
        .unplaced
        .iter()
        .chain(&report.unrouted)
        .map(|case: &Case| UnplacedRow {
            category: &case.category,
            case_id: &case.id,
            name: &case.name,
            case_group: &case.group,
            sponsors: case.sponsors.join(", "),
        })
        .collect();
    Ok(Some(ExportFile {
        name: UNPLACED_FILE.to_string(),
        bytes: to_csv(&rows)?,
    }))
}

/// Every file of a run's result set, in a stable order.
pub fn export_files(report: &RunReport) -> Result<Vec<ExportFile>, ExportError> {
    let mut files = category_csvs(report)?;
    files.extend(unplaced_csv(report)?);
    files.push(ExportFile {
        name: STATS_FILE.to_string(),
        bytes: serde_json::to_vec_pretty(&report.stats)?,
    });
    files.push(ExportFile {
        name: WARNINGS_FILE.to_string(),
        bytes: serde_json::to_vec_pretty(&report.warnings)?,
    });
    Ok(files)
}

/// Writes the result set into `dir`, creating it if needed.
pub fn write_dir(dir: impl AsRef<Path>, report: &RunReport) -> Result<Vec<PathBuf>, ExportError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for file in export_files(report)? {
        let path = dir.join(&file.name);
        fs::write(&path, &file.bytes).map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), bytes = file.bytes.len(), "result file written");
        written.push(path);
    }
    Ok(written)
}

fn to_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(BOM.to_vec());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

fn file_safe(category: &str) -> String {
    category
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
