use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("not authorized (HTTP {status}): check API key permissions")]
    Authorization { status: u16 },

    #[error("incident not found: {0}")]
    NotFound(String),

    #[error("API rejected request (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse API response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("poller is shut down")]
    PollerClosed,
}

impl PdError {
    /// Classify a non-success HTTP status for `incident_id`.
    pub(crate) fn from_status(status: u16, incident_id: &str, message: String) -> Self {
        match status {
            401 | 403 => PdError::Authorization { status },
            404 => PdError::NotFound(incident_id.to_string()),
            _ => PdError::Api { status, message },
        }
    }
}
