use std::time::Duration;

use ackd_server::{build_router, AppState};
use axum::http::StatusCode;
use http_body_util::BodyExt;
use pagerduty_api::{PdClient, Poller};
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TRIGGERED_A: &str = r#"{"incidents": [
    {"id": "A", "status": "triggered", "incident_number": 12,
     "title": "Disk full", "service": {"summary": "Database"}}
], "more": false}"#;

const ACKNOWLEDGED_A: &str = r#"{"incidents": [
    {"id": "A", "status": "acknowledged", "incident_number": 12,
     "title": "Disk full", "service": {"summary": "Database"}}
], "more": false}"#;

async fn incidents_mock(server: &mut mockito::ServerGuard, body: &str) -> mockito::Mock {
    server
        .mock("GET", "/incidents")
        .match_query(mockito::Matcher::Any)
        .with_body(body)
        .create_async()
        .await
}

/// Spin up an AppState against a mockito upstream and wait for the initial
/// reconciliation pass to land.
async fn app(server: &mockito::ServerGuard, dir: &TempDir) -> (axum::Router, AppState) {
    let client = PdClient::new(server.url(), "test-key", Some("ops@example.com".into()));
    let poller = Poller::spawn(client.clone(), Duration::from_secs(3600));
    let registry = ackd_core::registry::Registry::new(dir.path(), "test");
    let state = AppState::new(client, poller, registry, "test".into());

    wait_until(|| async {
        state.last_pass_at().await.is_some()
    })
    .await;

    (build_router(state.clone()), state)
}

/// Poll `cond` until it holds (or panic after ~2s).
async fn wait_until<F, Fut>(cond: F)
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if cond().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request via `oneshot` and return (status, parsed JSON body).
async fn post(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn seed_record(dir: &TempDir, control_id: &str) {
    let record = ackd_core::registry::ControlRecord {
        control_id: control_id.into(),
        scope: "test".into(),
        incident_number: 0,
        created_at: chrono::Utc::now(),
    };
    std::fs::write(
        dir.path().join(format!("{control_id}.yaml")),
        serde_yaml::to_string(&record).unwrap(),
    )
    .unwrap();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lists_controls_for_triggered_incidents() {
    let mut server = mockito::Server::new_async().await;
    let _incidents = incidents_mock(&mut server, TRIGGERED_A).await;
    let dir = TempDir::new().unwrap();
    let (router, state) = app(&server, &dir).await;

    let (status, body) = get(router, "/api/controls").await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["control_id"], "ack_A");
    assert_eq!(list[0]["name"], "Acknowledge Incident #12");
    assert_eq!(list[0]["available"], true);
    assert_eq!(list[0]["incident_title"], "Disk full");
    assert_eq!(list[0]["service_name"], "Database");

    // Creation also persisted a registry record.
    assert!(dir.path().join("ack_A.yaml").exists());
    state.poller.shutdown();
}

#[tokio::test]
async fn unknown_control_is_404() {
    let mut server = mockito::Server::new_async().await;
    let _incidents = incidents_mock(&mut server, r#"{"incidents": [], "more": false}"#).await;
    let dir = TempDir::new().unwrap();
    let (router, state) = app(&server, &dir).await;

    let (status, _) = get(router.clone(), "/api/controls/ack_NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = post(router, "/api/controls/ack_NOPE/press").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    state.poller.shutdown();
}

#[tokio::test]
async fn press_acknowledges_and_control_is_destroyed_by_refresh() {
    let mut server = mockito::Server::new_async().await;
    let initial = incidents_mock(&mut server, TRIGGERED_A).await;
    let dir = TempDir::new().unwrap();
    let (router, state) = app(&server, &dir).await;

    // After the acknowledge, the refreshed snapshot reports A acknowledged.
    initial.remove_async().await;
    let _incidents = incidents_mock(&mut server, ACKNOWLEDGED_A).await;
    let put = server
        .mock("PUT", "/incidents/A")
        .match_header("from", "ops@example.com")
        .with_status(200)
        .create_async()
        .await;

    let (status, body) = post(router, "/api/controls/ack_A/press").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["incident_id"], "A");
    put.assert_async().await;

    // The out-of-band refresh destroys the control and its record.
    wait_until(|| async { !dir.path().join("ack_A.yaml").exists() }).await;
    assert!(state.reconciler.read().await.is_empty());
    state.poller.shutdown();
}

#[tokio::test]
async fn failed_press_maps_status_and_leaves_control_present() {
    let mut server = mockito::Server::new_async().await;
    let _incidents = incidents_mock(&mut server, TRIGGERED_A).await;
    let _put = server
        .mock("PUT", "/incidents/A")
        .with_status(403)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let (router, state) = app(&server, &dir).await;

    let (status, body) = post(router.clone(), "/api/controls/ack_A/press").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("A"));

    // Control is still present and available; the operator may retry.
    let (status, body) = get(router, "/api/controls/ack_A").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);
    state.poller.shutdown();
}

#[tokio::test]
async fn press_after_destroy_resolves_as_404() {
    let mut server = mockito::Server::new_async().await;
    let initial = incidents_mock(&mut server, TRIGGERED_A).await;
    let dir = TempDir::new().unwrap();
    let (router, state) = app(&server, &dir).await;

    // A resolves out from under the UI before the operator presses.
    initial.remove_async().await;
    let _incidents = incidents_mock(&mut server, r#"{"incidents": [], "more": false}"#).await;
    state.poller.request_refresh().await.unwrap();
    wait_until(|| async { state.reconciler.read().await.is_empty() }).await;

    let (status, _) = post(router, "/api/controls/ack_A/press").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    state.poller.shutdown();
}

#[tokio::test]
async fn startup_sweep_purges_stale_records_only() {
    let mut server = mockito::Server::new_async().await;
    let _incidents = incidents_mock(
        &mut server,
        r#"{"incidents": [{"id": "2", "status": "triggered"}], "more": false}"#,
    )
    .await;
    let dir = TempDir::new().unwrap();
    seed_record(&dir, "ack_1");
    seed_record(&dir, "ack_2");
    seed_record(&dir, "ack_3");
    seed_record(&dir, "sensor_7");

    let (_router, state) = app(&server, &dir).await;

    assert!(!dir.path().join("ack_1.yaml").exists());
    assert!(dir.path().join("ack_2.yaml").exists());
    assert!(!dir.path().join("ack_3.yaml").exists());
    // Foreign object classes are never touched.
    assert!(dir.path().join("sensor_7.yaml").exists());
    state.poller.shutdown();
}

#[tokio::test]
async fn status_reports_counts_and_scope() {
    let mut server = mockito::Server::new_async().await;
    let _incidents = incidents_mock(&mut server, TRIGGERED_A).await;
    let dir = TempDir::new().unwrap();
    let (router, state) = app(&server, &dir).await;

    let (status, body) = get(router, "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scope"], "test");
    assert_eq!(body["incidents"], 1);
    assert_eq!(body["triggered"], 1);
    assert_eq!(body["controls"], 1);
    assert!(body["last_pass_at"].is_string());
    state.poller.shutdown();
}
