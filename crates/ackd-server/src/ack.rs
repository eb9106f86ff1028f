use ackd_core::control::AckControl;
use pagerduty_api::{PdClient, PdError, Poller};
use thiserror::Error;

/// Failure of one acknowledge attempt. The control stays present and
/// available; the operator may simply press it again.
#[derive(Debug, Error)]
#[error("failed to acknowledge incident {incident_id}: {cause}")]
pub struct AckError {
    pub incident_id: String,
    #[source]
    pub cause: PdError,
}

/// Acknowledge the incident behind `control`: one remote attempt, no retry.
///
/// On success, requests an immediate out-of-band snapshot refresh so the
/// control is destroyed by the next reconciliation pass instead of waiting
/// out the poll interval. A failed refresh is only logged — the acknowledge
/// itself already took effect and the regular poll will catch up.
///
/// Runs off the reconciliation path; it never touches the tracked control
/// set. A reconciliation pass may legally destroy the control while this
/// call is in flight.
pub async fn acknowledge(
    control: &AckControl,
    client: &PdClient,
    poller: &Poller,
) -> Result<(), AckError> {
    tracing::info!(incident_id = %control.incident_id, "acknowledging incident");

    client
        .acknowledge_incident(&control.incident_id)
        .await
        .map_err(|cause| {
            tracing::error!(
                incident_id = %control.incident_id,
                error = %cause,
                "failed to acknowledge incident"
            );
            AckError {
                incident_id: control.incident_id.clone(),
                cause,
            }
        })?;

    tracing::info!(incident_id = %control.incident_id, "incident acknowledged");

    if let Err(err) = poller.request_refresh().await {
        tracing::warn!(
            incident_id = %control.incident_id,
            error = %err,
            "post-acknowledge refresh failed; next poll will catch up"
        );
    }
    Ok(())
}
