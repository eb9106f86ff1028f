use axum::extract::{Path, State};
use axum::Json;

use ackd_core::control::AckControl;
use pagerduty_api::Incident;

use crate::ack;
use crate::error::AppError;
use crate::state::AppState;

fn control_json(control: &AckControl, snapshot: &[Incident]) -> serde_json::Value {
    serde_json::json!({
        "control_id": control.control_id,
        "name": control.name(),
        "available": control.available(snapshot),
        "incident_id": control.incident_id,
        "incident_number": control.incident_number,
        "incident_title": control.title,
        "service_name": control.service_name,
        "created_at": control.created_at,
    })
}

/// GET /api/controls — list all live acknowledge controls.
pub async fn list_controls(State(app): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = app.poller.current_snapshot();
    let reconciler = app.reconciler.read().await;
    let list: Vec<serde_json::Value> = reconciler
        .controls()
        .into_iter()
        .map(|c| control_json(c, &snapshot))
        .collect();
    Json(serde_json::json!(list))
}

/// GET /api/controls/:control_id — one control's detail.
pub async fn get_control(
    State(app): State<AppState>,
    Path(control_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let snapshot = app.poller.current_snapshot();
    let reconciler = app.reconciler.read().await;
    let control = reconciler
        .find_by_control_id(&control_id)
        .ok_or_else(|| AppError::not_found(format!("no such control: {control_id}")))?;
    Ok(Json(control_json(control, &snapshot)))
}

/// POST /api/controls/:control_id/press — trigger the acknowledge action.
///
/// The control is cloned out of the tracked set before the remote call, so
/// a reconciliation pass destroying it mid-flight is harmless — the call
/// completes against its own copy.
pub async fn press_control(
    State(app): State<AppState>,
    Path(control_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let control = {
        let reconciler = app.reconciler.read().await;
        reconciler
            .find_by_control_id(&control_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("no such control: {control_id}")))?
    };

    ack::acknowledge(&control, &app.client, &app.poller).await?;

    Ok(Json(serde_json::json!({
        "incident_id": control.incident_id,
        "status": "acknowledged",
    })))
}
