use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pagerduty_api::PdError;

use crate::ack::AckError;

fn pd_status(err: &PdError) -> StatusCode {
    match err {
        PdError::Authorization { .. } => StatusCode::FORBIDDEN,
        PdError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    }
}

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 404 errors
// ---------------------------------------------------------------------------

/// Private sentinel error type used to carry an explicit HTTP 404 through
/// the `anyhow::Error` chain.
#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 404 Not Found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.0.downcast_ref::<NotFoundError>().is_some() {
            StatusCode::NOT_FOUND
        } else if let Some(ack) = self.0.downcast_ref::<AckError>() {
            pd_status(&ack.cause)
        } else if let Some(pd) = self.0.downcast_ref::<PdError>() {
            pd_status(pd)
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = axum::Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
