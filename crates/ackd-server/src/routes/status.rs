use axum::extract::State;
use axum::Json;
use pagerduty_api::IncidentStatus;

use crate::state::AppState;

/// GET /api/status — scope, snapshot counts, and last pass time.
pub async fn get_status(State(app): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = app.poller.current_snapshot();
    let triggered = snapshot
        .iter()
        .filter(|i| i.status == IncidentStatus::Triggered)
        .count();
    let controls = app.reconciler.read().await.len();

    Json(serde_json::json!({
        "scope": app.scope,
        "incidents": snapshot.len(),
        "triggered": triggered,
        "controls": controls,
        "last_pass_at": app.last_pass_at().await,
    }))
}
