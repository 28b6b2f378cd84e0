//! Packs a run's result set into a single zip, as returned by the HTTP API.

use std::io::{Cursor, Write};

use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::data::export::{export_files, ExportError};
use crate::planner::RunReport;

pub const ARCHIVE_NAME: &str = "committee_results.zip";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    run_id: &'a str,
    seed: u64,
    generated_at: String,
    elapsed_ms: u64,
    files: Vec<&'a str>,
}

pub fn build_archive(report: &RunReport) -> Result<Vec<u8>, ExportError> {
    let files = export_files(report)?;
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for file in &files {
        zip.start_file(file.name.as_str(), options)?;
        zip.write_all(&file.bytes)?;
    }

    let manifest = Manifest {
        run_id: &report.run_id,
        seed: report.seed,
        generated_at: chrono::Utc::now().to_rfc3339(),
        elapsed_ms: report.elapsed_ms,
        files: files.iter().map(|file| file.name.as_str()).collect(),
    };
    zip.start_file(MANIFEST_FILE, options)?;
    zip.write_all(&serde_json::to_vec_pretty(&manifest)?)?;

    let bytes = zip.finish()?.into_inner();
    tracing::debug!(files = files.len() + 1, bytes = bytes.len(), "archive built");
    Ok(bytes)
}
