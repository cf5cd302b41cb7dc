//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use docrelay_core::Config;
use std::sync::Arc;

/// Validate config, start logging, build services and routes.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    validation::validate_config(&config).context("Configuration validation failed")?;

    docrelay_infra::init_telemetry(&config.environment)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        api_base = %config.nutrient.api_base,
        "Configuration loaded and validated successfully"
    );

    let state = services::initialize_services(&config)?;
    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
