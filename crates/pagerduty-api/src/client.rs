use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};

use crate::error::PdError;
use crate::types::{Incident, IncidentsPage};
use crate::Result;

/// Incidents are fetched in pages of this size.
const PAGE_LIMIT: usize = 100;

// ---------------------------------------------------------------------------
// PdClient
// ---------------------------------------------------------------------------

/// Authenticated session against one PagerDuty REST v2 endpoint.
///
/// Cheap to clone; all clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PdClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    from_email: Option<String>,
}

impl PdClient {
    /// Create a session for `base_url` (e.g. `https://api.pagerduty.com`).
    ///
    /// `from_email`, when set to a non-empty address, is sent as a `From`
    /// header on state-changing calls so PagerDuty attributes the action to
    /// that operator.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        from_email: Option<String>,
    ) -> Self {
        PdClient {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            from_email: from_email.filter(|e| !e.is_empty()),
        }
    }

    /// Fetch the current snapshot of open incidents (triggered and
    /// acknowledged), following offset pagination until the API reports no
    /// more pages.
    pub async fn list_incidents(&self) -> Result<Vec<Incident>> {
        let mut incidents = Vec::new();
        let mut offset = 0usize;

        loop {
            let resp = self
                .http
                .get(format!("{}/incidents", self.base_url))
                .header(AUTHORIZATION, format!("Token token={}", self.api_key))
                .header(ACCEPT, "application/json")
                .query(&[
                    ("statuses[]", "triggered".to_string()),
                    ("statuses[]", "acknowledged".to_string()),
                    ("limit", PAGE_LIMIT.to_string()),
                    ("offset", offset.to_string()),
                ])
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(match status.as_u16() {
                    401 | 403 => PdError::Authorization {
                        status: status.as_u16(),
                    },
                    s => PdError::Api { status: s, message },
                });
            }

            let page: IncidentsPage = resp.json().await?;
            let fetched = page.incidents.len();
            incidents.extend(page.incidents);

            if !page.more || fetched == 0 {
                return Ok(incidents);
            }
            offset += fetched;
        }
    }

    /// Acknowledge one incident: `PUT /incidents/{id}` with status
    /// `acknowledged`. Idempotent on the PagerDuty side — re-acknowledging
    /// an already-acknowledged incident succeeds.
    ///
    /// Exactly one attempt; no retry on failure.
    pub async fn acknowledge_incident(&self, incident_id: &str) -> Result<()> {
        let mut req = self
            .http
            .put(format!("{}/incidents/{incident_id}", self.base_url))
            .header(AUTHORIZATION, format!("Token token={}", self.api_key))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&serde_json::json!({
                "type": "incident",
                "status": "acknowledged",
            }));

        if let Some(email) = &self.from_email {
            req = req.header("From", email);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            tracing::debug!(incident_id, "acknowledge accepted");
            return Ok(());
        }

        let message = resp.text().await.unwrap_or_default();
        Err(PdError::from_status(status.as_u16(), incident_id, message))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
