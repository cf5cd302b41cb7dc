//! Service construction

use std::sync::Arc;

use anyhow::{Context, Result};
use docrelay_core::Config;
use docrelay_nutrient::{DemoFallback, DocumentApi, FallbackProvider, NutrientClient};

use crate::state::AppState;

pub fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let client = NutrientClient::new(config.nutrient.clone())
        .context("Failed to create Nutrient API client")?;
    let api: Arc<dyn DocumentApi> = Arc::new(client);
    let fallback: Arc<dyn FallbackProvider> = Arc::new(DemoFallback::new(config.demo.clone()));

    tracing::info!(
        timeout_secs = config.nutrient.timeout_secs,
        dispatch_concurrency = config.limits.dispatch_concurrency,
        "Document API client initialized"
    );

    Ok(Arc::new(AppState::new(config.clone(), api, fallback)))
}
