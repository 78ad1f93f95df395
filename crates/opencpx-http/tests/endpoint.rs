// crates/opencpx-http/tests/endpoint.rs
// ============================================================================
// Module: Posture Endpoint Tests
// Description: In-process HTTP tests for the posture route.
// Purpose: Pin status codes, headers, bodies, and audit records.
// ============================================================================

//! Router-level tests for the posture endpoint.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::Mutex;

use axum::Router;
use axum::body::Body;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::ALLOW;
use axum::http::header::CONTENT_TYPE;
use axum::response::Response;
use axum::routing::get;
use http_body_util::BodyExt;
use opencpx_config::CpxConfig;
use opencpx_core::Framework;
use opencpx_core::FrameworkStatus;
use opencpx_core::Organization;
use opencpx_core::Posture;
use opencpx_core::Timestamp;
use opencpx_core::decode;
use opencpx_http::CPX_VERSION_HEADER;
use opencpx_http::CpxAuditEvent;
use opencpx_http::CpxAuditSink;
use opencpx_http::CpxEndpoint;
use opencpx_http::CpxOutcome;
use opencpx_http::PostureProvider;
use opencpx_http::ResponseFormat;
use opencpx_http::endpoint_from_config;
use opencpx_http::validate_path;
use serde_json::Value;
use serde_json::json;
use tower::ServiceExt;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn sample_posture() -> Posture {
    let mut posture =
        Posture::new().with_generated_at(Timestamp::parse("2025-10-16T12:00:00Z").unwrap());
    posture.set_organization(Organization::new("Acme Corp").unwrap());
    posture
        .add_framework(
            Framework::new("SOC2", FrameworkStatus::Compliant, 1.0).unwrap().with_version("Type II"),
        )
        .unwrap();
    posture
        .add_framework(Framework::new("ISO27001", FrameworkStatus::Partial, 0.85).unwrap())
        .unwrap();
    posture
}

fn endpoint() -> CpxEndpoint {
    let posture = sample_posture();
    CpxEndpoint::new(move || Ok::<_, Infallible>(posture.clone()))
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<CpxAuditEvent>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<CpxAuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl CpxAuditSink for RecordingSink {
    fn record(&self, event: &CpxAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

async fn send(app: Router, method: Method, uri: &str) -> Response {
    let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ============================================================================
// SECTION: Success
// ============================================================================

#[tokio::test]
async fn get_serves_the_encoded_posture() {
    let response = send(endpoint().router(), Method::GET, "/cpx").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(response.headers()[CPX_VERSION_HEADER], "v1");

    let posture = decode(&body_bytes(response).await).unwrap();
    assert_eq!(posture, sample_posture());
}

#[tokio::test]
async fn body_carries_the_aggregated_posture() {
    let value = body_json(send(endpoint().router(), Method::GET, "/cpx").await).await;
    assert_eq!(value["compliance_posture"], "partially_compliant");
    assert_eq!(value["frameworks"][1]["score"], 0.85);
    assert_eq!(value["organization"], json!({ "name": "Acme Corp" }));
}

#[tokio::test]
async fn explicit_json_format_matches_default() {
    let default = body_bytes(send(endpoint().router(), Method::GET, "/cpx").await).await;
    let explicit = body_bytes(send(endpoint().router(), Method::GET, "/cpx?format=json").await).await;
    assert_eq!(default, explicit);
}

#[tokio::test]
async fn pretty_output_is_indented() {
    let response = send(endpoint().with_pretty(true).router(), Method::GET, "/cpx").await;
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("\n  \"version\": \"v1\""));
}

#[tokio::test]
async fn yaml_renders_the_same_document() {
    let json_value = body_json(send(endpoint().router(), Method::GET, "/cpx").await).await;

    let response = send(endpoint().router(), Method::GET, "/cpx?format=yaml").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/yaml");
    assert_eq!(response.headers()[CPX_VERSION_HEADER], "v1");
    let yaml_value: Value = serde_yaml::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(yaml_value, json_value);
}

#[tokio::test]
async fn custom_path_replaces_the_default() {
    let app = endpoint().with_path("/cts").unwrap().router();
    assert_eq!(send(app.clone(), Method::GET, "/cts").await.status(), StatusCode::OK);
    assert_eq!(send(app, Method::GET, "/cpx").await.status(), StatusCode::NOT_FOUND);
}

#[test]
fn route_syntax_in_path_is_rejected() {
    for path in ["cpx", "", "/cpx/{id}", "/cpx/:id", "/cpx/*rest", "/cpx?x=1", "/c px"] {
        let err = endpoint().with_path(path).err().unwrap();
        assert_eq!(err.path, path);
    }
    assert!(validate_path("/v1/posture").is_ok());
}

#[tokio::test]
async fn merge_into_keeps_existing_routes() {
    let host = Router::new().route("/health", get(|| async { "ok" }));
    let app = endpoint().merge_into(host);
    assert_eq!(send(app.clone(), Method::GET, "/health").await.status(), StatusCode::OK);
    assert_eq!(send(app, Method::GET, "/cpx").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn provider_runs_once_per_request() {
    let calls = Arc::new(Mutex::new(0_u32));
    let counter = Arc::clone(&calls);
    let app = CpxEndpoint::new(move || {
        *counter.lock().unwrap() += 1;
        Ok::<_, Infallible>(Posture::new())
    })
    .router();
    let _ = send(app.clone(), Method::GET, "/cpx").await;
    let _ = send(app, Method::GET, "/cpx").await;
    assert_eq!(*calls.lock().unwrap(), 2);
}

// ============================================================================
// SECTION: Errors
// ============================================================================

#[tokio::test]
async fn non_get_methods_are_rejected() {
    for method in [Method::POST, Method::PUT, Method::DELETE] {
        let response = send(endpoint().router(), method, "/cpx").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET");
    }
}

#[tokio::test]
async fn provider_failure_returns_fixed_envelope() {
    let app = CpxEndpoint::new(|| Err::<Posture, _>("database unavailable")).router();
    let response = send(app, Method::GET, "/cpx").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get(CPX_VERSION_HEADER).is_none());
    assert_eq!(body_json(response).await, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn panicking_provider_returns_fixed_envelope() {
    let sink = Arc::new(RecordingSink::default());
    let app = CpxEndpoint::new(|| -> Result<Posture, Infallible> { panic!("database unavailable") })
        .with_audit_sink(sink.clone())
        .router();
    let response = send(app.clone(), Method::GET, "/cpx").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({ "error": "Internal server error" }));

    // The router keeps serving after a provider panic.
    assert_eq!(send(app, Method::GET, "/cpx").await.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].outcome, CpxOutcome::Error);
    assert_eq!(events[0].error_kind, Some("provider"));
}

#[tokio::test]
async fn unsupported_format_is_a_bad_request() {
    let response = send(endpoint().router(), Method::GET, "/cpx?format=xml").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "error": "Unsupported format" }));
}

#[tokio::test]
async fn yaml_can_be_disabled() {
    let response = send(endpoint().with_yaml(false).router(), Method::GET, "/cpx?format=yaml").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// SECTION: Audit
// ============================================================================

#[tokio::test]
async fn every_request_emits_one_audit_event() {
    let sink = Arc::new(RecordingSink::default());
    let app = endpoint().with_audit_sink(sink.clone()).router();
    let _ = send(app.clone(), Method::GET, "/cpx?format=yaml").await;
    let _ = send(app.clone(), Method::POST, "/cpx").await;
    let _ = send(app, Method::GET, "/cpx?format=xml").await;

    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].status, 200);
    assert_eq!(events[0].format, Some(ResponseFormat::Yaml));
    assert_eq!(events[0].outcome, CpxOutcome::Ok);
    assert!(events[0].response_bytes > 0);
    assert_eq!(events[1].status, 405);
    assert_eq!(events[1].method, "POST");
    assert_eq!(events[2].error_kind, Some("unsupported_format"));
    assert!(events.iter().all(|event| event.event == "cpx_request" && event.path == "/cpx"));
}

#[tokio::test]
async fn provider_message_is_audited_not_returned() {
    let sink = Arc::new(RecordingSink::default());
    let app = CpxEndpoint::new(|| Err::<Posture, _>("database unavailable"))
        .with_audit_sink(sink.clone())
        .router();
    let body = body_bytes(send(app, Method::GET, "/cpx").await).await;
    assert!(!String::from_utf8(body).unwrap().contains("database"));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, CpxOutcome::Error);
    assert_eq!(events[0].error_kind, Some("provider"));
    assert_eq!(events[0].error_message.as_deref(), Some("database unavailable"));
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

#[tokio::test]
async fn endpoint_from_config_applies_server_settings() {
    let config = CpxConfig::from_toml_str(
        "[server]\npath = \"/cts\"\npretty = false\nallow_yaml = false\n\n[audit]\nsink = \"none\"",
    )
    .unwrap();
    let posture = sample_posture();
    let provider: Arc<dyn PostureProvider> =
        Arc::new(move || Ok::<_, Infallible>(posture.clone()));
    let endpoint = endpoint_from_config(&config, provider).unwrap();
    assert_eq!(endpoint.path(), "/cts");

    let app = endpoint.router();
    let response = send(app.clone(), Method::GET, "/cts").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!String::from_utf8(body_bytes(response).await).unwrap().contains('\n'));
    assert_eq!(send(app, Method::GET, "/cts?format=yaml").await.status(), StatusCode::BAD_REQUEST);
}
