//! Health and connectivity endpoints
//!
//! - `GET /api/health` - process is up, with version
//! - `GET /api/status` - storage backend reachability

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// Storage connectivity response
#[derive(Debug, Serialize)]
pub struct ConnectionStatus {
    pub backend: String,
    pub connected: bool,
}

async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// 200 when the backend answers, 503 otherwise
async fn connection_status(State(state): State<AppState>) -> (StatusCode, Json<ConnectionStatus>) {
    let connected = state.context.is_connected().await;
    let status = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ConnectionStatus {
            backend: state.context.name().to_string(),
            connected,
        }),
    )
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/status", get(connection_status))
}
