//! Payload builders behind the HTTP routes. Nothing here touches sockets, so
//! the whole request path can be exercised synchronously.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::config::RunConfig;
use crate::data::archive::build_archive;
use crate::data::export::ExportError;
use crate::data::workbook::{IngestError, Workbook};
use crate::pipeline::{self, PipelineError};
use crate::planner::RunStats;

/// Field names of the multipart upload.
pub const AVAILABILITY_FIELD: &str = "availability";
pub const CASES_FIELD: &str = "cases";
pub const SEED_FIELD: &str = "seed";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("invalid {field} file: {source}")]
    Upload {
        field: &'static str,
        #[source]
        source: IngestError,
    },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("failed to build result archive: {0}")]
    Export(#[from] ExportError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Upload { .. } => StatusCode::BAD_REQUEST,
            Self::Pipeline(PipelineError::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Pipeline(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Export(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::info!(error = %self, status = status.as_u16(), "request rejected");
        }
        json_response(status, error_body(&self.to_string()))
    }
}

pub fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

pub fn error_body(message: &str) -> String {
    format!(
        "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
        serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
    )
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "tribunal-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessRequest {
    pub availability: Option<Upload>,
    pub cases: Option<Upload>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub run_id: String,
    pub archive: Vec<u8>,
    pub stats: RunStats,
    pub warnings: usize,
}

/// Runs one full planning pass over the uploaded workbooks and zips the results.
///
/// Blocking; callers on an async runtime should move it off the reactor.
pub fn process_payload(request: ProcessRequest, base: &RunConfig) -> Result<ProcessResult, ApiError> {
    let availability = parse_upload(request.availability, AVAILABILITY_FIELD)?;
    let cases = parse_upload(request.cases, CASES_FIELD)?;

    let mut config = base.clone();
    if let Some(seed) = request.seed {
        config.engine.seed = seed;
    }

    let report = pipeline::run_workbooks(&availability, &cases, &config)?;
    let archive = build_archive(&report)?;
    Ok(ProcessResult {
        run_id: report.run_id,
        archive,
        stats: report.stats,
        warnings: report.warnings.len(),
    })
}

fn parse_upload(upload: Option<Upload>, field: &'static str) -> Result<Workbook, ApiError> {
    let upload = upload
        .filter(|upload| !upload.bytes.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("missing or empty '{field}' file")))?;
    Workbook::from_upload(upload.file_name.as_deref(), &upload.bytes)
        .map_err(|source| ApiError::Upload { field, source })
}

pub fn parse_seed(raw: &str) -> Result<u64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("seed must be a non-negative integer, got '{}'", raw.trim())))
}
