use chrono::{DateTime, Utc};
use pagerduty_api::{Incident, IncidentStatus};
use serde::Serialize;

/// Identifier prefix for acknowledge controls. Persisted records with a
/// different prefix belong to another object class and are never touched.
pub const CONTROL_PREFIX: &str = "ack_";

/// Derive a control id from an incident id: `ack_<incident_id>`.
pub fn control_id(incident_id: &str) -> String {
    format!("{CONTROL_PREFIX}{incident_id}")
}

/// Inverse of [`control_id`]: `None` when the id carries a foreign prefix.
pub fn incident_id_from_control_id(control_id: &str) -> Option<&str> {
    control_id.strip_prefix(CONTROL_PREFIX)
}

// ---------------------------------------------------------------------------
// AckControl
// ---------------------------------------------------------------------------

/// One actionable acknowledge control, tracking exactly one currently
/// triggered incident.
///
/// Display fields are a snapshot-time copy taken at creation; they are not
/// refreshed while the incident stays triggered. The control never mutates
/// its incident — the only write path is the acknowledge call itself.
#[derive(Debug, Clone, Serialize)]
pub struct AckControl {
    pub control_id: String,
    pub incident_id: String,
    pub incident_number: u64,
    pub title: String,
    pub service_name: String,
    pub created_at: DateTime<Utc>,
}

impl AckControl {
    /// Build a control from the incident's current field values.
    pub fn from_incident(incident: &Incident) -> Self {
        AckControl {
            control_id: control_id(&incident.id),
            incident_id: incident.id.clone(),
            incident_number: incident.incident_number,
            title: incident.display_title().to_string(),
            service_name: incident.service_name().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Display name shown to the operator.
    pub fn name(&self) -> String {
        format!("Acknowledge Incident #{}", self.incident_number)
    }

    /// Availability predicate: is this control still valid against the
    /// current snapshot?
    ///
    /// Informational only — it may transiently disagree with the tracked
    /// control set between polls, and destruction never consults it.
    pub fn available(&self, snapshot: &[Incident]) -> bool {
        snapshot
            .iter()
            .find(|i| i.id == self.incident_id)
            .map(|i| i.status == IncidentStatus::Triggered)
            .unwrap_or(false)
    }
}
