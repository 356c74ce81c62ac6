//! Application setup and initialization
//!
//! Everything `main` needs to go from a `Config` to a router: telemetry,
//! database, services and routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use socialhub_core::Config;
use socialhub_infra::{init_telemetry, LogFormat};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Telemetry first so validation warnings are emitted
    init_telemetry(LogFormat::from_env(), config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    validation::validate_config(&config).context("Configuration validation failed")?;

    tracing::info!("Configuration loaded and validated successfully");

    let pool = database::setup_database(&config).await?;
    let state = services::initialize_services(&config, pool)?;
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
