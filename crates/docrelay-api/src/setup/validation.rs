//! Configuration validation
//!
//! Runs at startup so misconfiguration fails the process instead of individual requests.

use anyhow::Result;
use docrelay_core::Config;

/// Upper bound on `DISPATCH_CONCURRENCY`; higher values only queue at the external API.
const MAX_DISPATCH_CONCURRENCY: usize = 16;

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.nutrient.viewer_api_key == config.nutrient.processor_api_key {
        tracing::debug!("NUTRIENT_VIEWER_API_KEY not set, using the processor key for viewer sessions");
    }

    if config.limits.dispatch_concurrency > MAX_DISPATCH_CONCURRENCY {
        return Err(anyhow::anyhow!(
            "DISPATCH_CONCURRENCY cannot exceed {}",
            MAX_DISPATCH_CONCURRENCY
        ));
    }

    if config.limits.dispatch_concurrency > config.limits.max_files {
        tracing::warn!(
            dispatch_concurrency = config.limits.dispatch_concurrency,
            max_files = config.limits.max_files,
            "DISPATCH_CONCURRENCY is higher than MAX_FILES and will never be reached"
        );
    }

    Ok(())
}
