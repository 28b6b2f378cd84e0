use std::path::Path;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::RunConfig;
use crate::data::archive::ARCHIVE_NAME;
use crate::server::api::{self, ApiError, ProcessRequest, Upload};

/// Uploads above this size are rejected before parsing.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Shared, read-only server state. Every request builds its own engine from it.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub config: Arc<RunConfig>,
}

impl AppState {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessQuery {
    pub seed: Option<u64>,
}

pub fn router(state: AppState) -> Router {
    with_static(
        Router::new()
            .route("/", get(index))
            .route("/api/health", get(health))
            .route("/api/process", post(process))
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
            .layer(CorsLayer::permissive())
            .with_state(state),
        Path::new("frontend/dist"),
    )
}

/// Serves a built front end from `dist` when present; unknown paths get a JSON 404 otherwise.
pub fn with_static(router: Router, dist: &Path) -> Router {
    let index = dist.join("index.html");
    if index.is_file() {
        tracing::info!(dist = %dist.display(), "serving static front end");
        router.fallback_service(ServeDir::new(dist).not_found_service(ServeFile::new(index)))
    } else {
        router.fallback(not_found)
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Response {
    match api::health_payload() {
        Ok(payload) => api::json_response(StatusCode::OK, payload),
        Err(err) => ApiError::Internal(err.to_string()).into_response(),
    }
}

async fn not_found() -> Response {
    api::json_response(StatusCode::NOT_FOUND, api::error_body("Not found"))
}

async fn process(
    State(state): State<AppState>,
    Query(query): Query<ProcessQuery>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut request = ProcessRequest {
        seed: query.seed,
        ..ProcessRequest::default()
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(format!("invalid multipart body: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::BadRequest(format!("failed to read field '{name}': {err}")))?;
        match name.as_str() {
            api::AVAILABILITY_FIELD => {
                request.availability = Some(Upload {
                    file_name,
                    bytes: bytes.to_vec(),
                })
            }
            api::CASES_FIELD => {
                request.cases = Some(Upload {
                    file_name,
                    bytes: bytes.to_vec(),
                })
            }
            api::SEED_FIELD => {
                let raw = String::from_utf8_lossy(&bytes);
                request.seed = Some(api::parse_seed(&raw)?);
            }
            other => tracing::debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    let config = Arc::clone(&state.config);
    let result = tokio::task::spawn_blocking(move || api::process_payload(request, &config))
        .await
        .map_err(|err| ApiError::Internal(format!("planning task failed: {err}")))??;

    tracing::info!(
        run_id = %result.run_id,
        committees = result.stats.total_committees,
        placed = result.stats.cases_placed,
        unplaced = result.stats.unplaced_cases,
        warnings = result.warnings,
        "processed upload"
    );

    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{ARCHIVE_NAME}\""),
            ),
        ],
        result.archive,
    )
        .into_response();
    if let Ok(value) = HeaderValue::from_str(&result.run_id) {
        response.headers_mut().insert("x-run-id", value);
    }
    Ok(response)
}

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Tribunal Console</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 900px; margin: 24px auto; padding: 0 12px; }
    h1 { margin-bottom: 8px; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 14px; margin: 14px 0; }
    label { display:block; margin: 8px 0 4px; font-weight: 600; }
    input { width: 100%; padding: 8px; box-sizing: border-box; }
    button { margin-top: 12px; padding: 8px 14px; }
    pre { background: #111; color: #aef2ae; padding: 12px; overflow: auto; border-radius: 6px; min-height: 120px; }
  </style>
</head>
<body>
  <h1>Tribunal</h1>
  <p>Upload the availability and case workbooks to receive the committee plan as a zip of CSV files.</p>

  <div class="card">
    <strong>Health</strong>
    <div><button id="health-btn">GET /api/health</button></div>
  </div>

  <div class="card">
    <strong>Plan committees</strong>
    <form id="process-form">
      <label for="availability">Availability workbook</label>
      <input id="availability" name="availability" type="file" accept=".xlsx,.xls,.ods,.csv" required />
      <label for="cases">Case workbook</label>
      <input id="cases" name="cases" type="file" accept=".xlsx,.xls,.ods,.csv" required />
      <label for="seed">Seed</label>
      <input id="seed" name="seed" type="number" min="0" value="42" />
      <button type="submit">POST /api/process</button>
    </form>
  </div>

  <pre id="output">Ready.</pre>

  <script>
    const output = document.getElementById('output');
    document.getElementById('health-btn').addEventListener('click', async () => {
      const res = await fetch('/api/health');
      output.textContent = await res.text();
    });
    document.getElementById('process-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      output.textContent = 'Processing...';
      const res = await fetch('/api/process', { method: 'POST', body: new FormData(event.target) });
      if (!res.ok) {
        output.textContent = await res.text();
        return;
      }
      const blob = await res.blob();
      const link = document.createElement('a');
      link.href = URL.createObjectURL(blob);
      link.download = 'committee_results.zip';
      link.click();
      output.textContent = 'Run ' + (res.headers.get('x-run-id') || '') + ' complete.';
    });
  </script>
</body>
</html>
"#;
