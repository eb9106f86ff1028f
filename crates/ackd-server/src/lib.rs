pub mod ack;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use ack::{acknowledge, AckError};
pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Status
        .route("/api/status", get(routes::status::get_status))
        // Controls
        .route("/api/controls", get(routes::controls::list_controls))
        .route(
            "/api/controls/{control_id}",
            get(routes::controls::get_control),
        )
        .route(
            "/api/controls/{control_id}/press",
            post(routes::controls::press_control),
        )
        .layer(cors)
        .with_state(app_state)
}

/// Start the control API server.
pub async fn serve(app_state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, listener).await
}

/// Start the control API server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so
/// the caller can read the actual port before starting (useful when
/// `port = 0` and the OS picks a free port).
pub async fn serve_on(app_state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(app_state);

    tracing::info!("ackd control API listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
