use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// IncidentStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a PagerDuty incident.
///
/// The REST API may grow new statuses; anything unrecognized maps to
/// `Other` rather than failing the whole snapshot parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Triggered,
    Acknowledged,
    Resolved,
    #[default]
    #[serde(other)]
    Other,
}

// ---------------------------------------------------------------------------
// ServiceRef
// ---------------------------------------------------------------------------

/// Reference object embedded in an incident pointing at its service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceRef {
    #[serde(default)]
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Incident
// ---------------------------------------------------------------------------

/// One incident record as returned by `GET /incidents`.
///
/// Only the fields the acknowledge workflow reads are modeled; everything
/// else in the API payload is ignored. Every field defaults so one
/// malformed record cannot fail the whole page: an `id`-less record
/// deserializes with an empty id (consumers skip those entries), and a
/// status-less record reads as `Other`, i.e. not triggered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: IncidentStatus,
    #[serde(default)]
    pub incident_number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub service: Option<ServiceRef>,
}

impl Incident {
    /// Display name of the owning service, or "Unknown".
    pub fn service_name(&self) -> &str {
        match &self.service {
            Some(s) if !s.summary.is_empty() => &s.summary,
            _ => "Unknown",
        }
    }

    /// Display title, or "Unknown".
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Unknown"
        } else {
            &self.title
        }
    }
}

// ---------------------------------------------------------------------------
// IncidentsPage
// ---------------------------------------------------------------------------

/// Envelope for one page of `GET /incidents`.
#[derive(Debug, Deserialize)]
pub struct IncidentsPage {
    #[serde(default)]
    pub incidents: Vec<Incident>,
    #[serde(default)]
    pub more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_incident() {
        let json = r#"{
            "id": "PABC123",
            "status": "triggered",
            "incident_number": 42,
            "title": "Disk full on db-1",
            "service": {"summary": "Database"}
        }"#;
        let inc: Incident = serde_json::from_str(json).unwrap();
        assert_eq!(inc.id, "PABC123");
        assert_eq!(inc.status, IncidentStatus::Triggered);
        assert_eq!(inc.incident_number, 42);
        assert_eq!(inc.service_name(), "Database");
    }

    #[test]
    fn unknown_status_maps_to_other() {
        let json = r#"{"id": "P1", "status": "snoozed"}"#;
        let inc: Incident = serde_json::from_str(json).unwrap();
        assert_eq!(inc.status, IncidentStatus::Other);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let json = r#"{"id": "P1", "status": "triggered"}"#;
        let inc: Incident = serde_json::from_str(json).unwrap();
        assert_eq!(inc.display_title(), "Unknown");
        assert_eq!(inc.service_name(), "Unknown");
        assert_eq!(inc.incident_number, 0);
    }

    #[test]
    fn status_less_record_does_not_fail_the_page() {
        let json = r#"{
            "incidents": [
                {"id": "GOOD", "status": "triggered"},
                {"id": "BAD"}
            ],
            "more": false
        }"#;
        let page: IncidentsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.incidents.len(), 2);
        assert_eq!(page.incidents[0].id, "GOOD");
        assert_eq!(page.incidents[0].status, IncidentStatus::Triggered);
        assert_eq!(page.incidents[1].status, IncidentStatus::Other);
    }

    #[test]
    fn page_envelope_defaults() {
        let page: IncidentsPage = serde_json::from_str(r#"{"incidents": []}"#).unwrap();
        assert!(page.incidents.is_empty());
        assert!(!page.more);
    }
}
