//! Taskboard server binary
//!
//! # Usage
//!
//! ```bash
//! TASKBOARD_SECRET=change-me cargo run --bin taskboard-server
//!
//! # In-memory storage, custom port
//! TASKBOARD_SECRET=change-me TASKBOARD_DATABASE=memory TASKBOARD_PORT=8080 \
//!     cargo run --bin taskboard-server
//! ```
//!
//! See `taskboard_core::config` for every environment variable.
//! `RUST_LOG` controls logging (default: `info`).

use anyhow::Context;
use taskboard_core::{AppConfig, DataContext};
use taskboard_server::{start_server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        backend = %config.database.backend,
        location = %config.database.location,
        port = config.port,
        "Starting Taskboard server"
    );

    let context = DataContext::create_context(&config.database)
        .await
        .context("Failed to open database")?;

    if !context.is_connected().await {
        anyhow::bail!("Database at {} is not reachable", config.database.location);
    }

    let state = AppState::new(context, &config.credentials);
    start_server(state, config.port).await
}
