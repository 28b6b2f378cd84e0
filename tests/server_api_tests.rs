use std::io::{Cursor, Read};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;
use tribunal::config::RunConfig;
use tribunal::server::{router, AppState};

const BOUNDARY: &str = "tribunal-test-boundary";

fn app() -> Router {
    let mut config = RunConfig::default();
    // CSV uploads carry a single sheet, which is the only group.
    config.availability.skip_trailing_sheets = 0;
    config.engine.slot_count = 2;
    router(AppState::new(config))
}

fn multipart(parts: &[(&str, Option<&str>, &str)]) -> Body {
    let mut body = String::new();
    for (name, file_name, content) in parts {
        body.push_str(&format!("--{BOUNDARY}\r\n"));
        match file_name {
            Some(file_name) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n"
            )),
            None => body.push_str(&format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")),
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    Body::from(body)
}

fn process_request(uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body)
        .expect("request builds")
}

fn availability_csv() -> String {
    let mut rows = String::from(";;;;Mon;Mon\n;;;;AM;PM\nname;email;times;weight;;\n");
    for i in 0..6 {
        rows.push_str(&format!("P{i};p{i}@x;{};0;Sí;Sí\n", i % 2));
    }
    rows
}

fn cases_csv() -> String {
    let mut rows = String::from("entry;id;name;email;login;title;tutors;degree\n");
    for i in 0..9 {
        let degree = if i % 3 == 0 { "GIC" } else { "GII" };
        rows.push_str(&format!("{i};T{i};Student {i};;;;p{}@x(P);{degree}\n", i % 6));
    }
    rows
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads")
        .to_vec()
}

#[tokio::test]
async fn health_endpoint_returns_ok_json() {
    let response = app()
        .oneshot(Request::get("/api/health").body(Body::empty()).expect("request"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let body = String::from_utf8(body_bytes(response).await).expect("utf-8");
    assert!(body.contains("\"status\": \"ok\""));
}

#[tokio::test]
async fn index_serves_upload_console() {
    let response = app()
        .oneshot(Request::get("/").body(Body::empty()).expect("request"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = String::from_utf8(body_bytes(response).await).expect("utf-8");
    assert!(body.contains("/api/process"));
}

#[tokio::test]
async fn process_returns_zip_of_results() {
    let availability = availability_csv();
    let cases = cases_csv();
    let body = multipart(&[
        ("availability", Some("availability.csv"), &availability),
        ("cases", Some("cases.csv"), &cases),
        ("seed", None, "7"),
    ]);
    let response = app()
        .oneshot(process_request("/api/process", body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
    assert!(response
        .headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .expect("ascii header")
        .contains("committee_results.zip"));
    assert!(response.headers().contains_key("x-run-id"));

    let bytes = body_bytes(response).await;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    assert!(names.iter().any(|n| n == "stats.json"));
    assert!(names.iter().any(|n| n == "manifest.json"));

    let mut stats = String::new();
    archive
        .by_name("stats.json")
        .expect("stats entry")
        .read_to_string(&mut stats)
        .expect("utf-8");
    let stats: serde_json::Value = serde_json::from_str(&stats).expect("json");
    assert_eq!(stats["total_cases"], 9);

    let mut manifest = String::new();
    archive
        .by_name("manifest.json")
        .expect("manifest entry")
        .read_to_string(&mut manifest)
        .expect("utf-8");
    let manifest: serde_json::Value = serde_json::from_str(&manifest).expect("json");
    assert_eq!(manifest["seed"], 7);
}

#[tokio::test]
async fn seed_can_come_from_the_query_string() {
    let availability = availability_csv();
    let cases = cases_csv();
    let body = multipart(&[
        ("availability", Some("availability.csv"), &availability),
        ("cases", Some("cases.csv"), &cases),
    ]);
    let response = app()
        .oneshot(process_request("/api/process?seed=99", body))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = body_bytes(response).await;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let mut manifest = String::new();
    archive
        .by_name("manifest.json")
        .expect("manifest entry")
        .read_to_string(&mut manifest)
        .expect("utf-8");
    let manifest: serde_json::Value = serde_json::from_str(&manifest).expect("json");
    assert_eq!(manifest["seed"], 99);
}

#[tokio::test]
async fn process_without_cases_is_bad_request() {
    let availability = availability_csv();
    let body = multipart(&[("availability", Some("availability.csv"), &availability)]);
    let response = app()
        .oneshot(process_request("/api/process", body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload: serde_json::Value =
        serde_json::from_slice(&body_bytes(response).await).expect("error json");
    assert_eq!(payload["status"], "error");
    assert!(payload["message"].as_str().unwrap_or_default().contains("cases"));
}

#[tokio::test]
async fn invalid_seed_field_is_bad_request() {
    let availability = availability_csv();
    let cases = cases_csv();
    let body = multipart(&[
        ("availability", Some("availability.csv"), &availability),
        ("cases", Some("cases.csv"), &cases),
        ("seed", None, "forty-two"),
    ]);
    let response = app()
        .oneshot(process_request("/api/process", body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unreadable_workbook_is_bad_request() {
    let cases = cases_csv();
    let body = multipart(&[
        ("availability", Some("availability.xlsx"), "not really a spreadsheet"),
        ("cases", Some("cases.csv"), &cases),
    ]);
    let response = app()
        .oneshot(process_request("/api/process", body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload: serde_json::Value =
        serde_json::from_slice(&body_bytes(response).await).expect("error json");
    assert!(payload["message"]
        .as_str()
        .unwrap_or_default()
        .contains("availability"));
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let response = app()
        .oneshot(Request::get("/api/nope").body(Body::empty()).expect("request"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload: serde_json::Value =
        serde_json::from_slice(&body_bytes(response).await).expect("error json");
    assert_eq!(payload["status"], "error");
}
