//! HTTP/WebSocket API for the session server.
//!
//! # Endpoints
//!
//! - `GET /ws` - Upgrade to WebSocket and take a seat in the session
//! - `GET /health` - Server and session status
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tt_server::api::{create_router, AppState};
//! use turn_table::{SessionConfig, SessionCoordinator};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let config = SessionConfig::default();
//! let state = AppState {
//!     session: SessionCoordinator::spawn(&config),
//!     outbox_capacity: config.outbox_capacity,
//! };
//!
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:6969").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively. In production, configure appropriate
//! origins, methods, and headers.

pub mod request_id;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use turn_table::SessionHandle;

/// Application state shared across all HTTP handlers and WebSocket connections.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the session coordinator
    pub session: SessionHandle,
    /// Outbox capacity for each new player connection
    pub outbox_capacity: usize,
}

/// Create the API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` with the session roster if the coordinator answers, or
/// `503 Service Unavailable` if it has stopped.
///
/// # Example
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","session":{"players":["P1"],"turn":null,"game_started":false},...}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (status_code, session) = match state.session.snapshot().await {
        Ok(snapshot) => (StatusCode::OK, json!(snapshot)),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, json!(null)),
    };

    let response = json!({
        "status": if status_code == StatusCode::OK { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "session": session,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
