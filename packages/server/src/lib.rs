//! Taskboard HTTP server
//!
//! REST API over the Taskboard controllers.
//!
//! # Architecture
//!
//! The router is assembled from one module per resource:
//! - `routes::health`: liveness and storage connectivity (public)
//! - `routes::accounts`: registration and login (public)
//! - `routes::tasks`, `routes::items`: resource CRUD (bearer token)
//!
//! Request payloads are validated against the entity definitions before a
//! controller runs; failures answer `400 VALIDATION_ERROR`.

use axum::{
    http::{header, Method},
    middleware, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use taskboard_core::config::CredentialConfig;
use taskboard_core::services::{AccountController, ItemController, TaskController};
use taskboard_core::DataContext;

pub mod auth;
pub mod http_error;
pub mod routes;
pub mod validation;

pub use http_error::HttpError;

/// Application state shared across all endpoints
///
/// Every controller owns a private fork of `context`; the root context is
/// only used for connectivity checks.
#[derive(Clone)]
pub struct AppState {
    pub context: Arc<DataContext>,
    pub accounts: Arc<AccountController>,
    pub tasks: Arc<TaskController>,
    pub items: Arc<ItemController>,
}

impl AppState {
    pub fn new(context: DataContext, credentials: &CredentialConfig) -> Self {
        Self {
            accounts: Arc::new(AccountController::from_config(&context, credentials)),
            tasks: Arc::new(TaskController::new(&context)),
            items: Arc::new(ItemController::new(&context)),
            context: Arc::new(context),
        }
    }
}

/// Create the main application router with all endpoint modules
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(routes::tasks::routes())
        .merge(routes::items::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .merge(routes::health::routes())
        .merge(routes::accounts::routes())
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Start the HTTP server and run until SIGINT/SIGTERM
///
/// # Errors
///
/// Returns error if server fails to bind or start.
pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Taskboard server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Taskboard server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
