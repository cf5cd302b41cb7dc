//! Application state shared by every handler.
//!
//! Built once at startup and read-only afterwards.

use std::sync::Arc;

use docrelay_core::Config;
use docrelay_nutrient::{DocumentApi, FallbackProvider};

use crate::services::{Aggregator, Dispatcher};
use crate::utils::multipart::UploadLimits;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub api: Arc<dyn DocumentApi>,
    pub fallback: Arc<dyn FallbackProvider>,
    pub aggregator: Aggregator,
}

impl AppState {
    pub fn new(
        config: Config,
        api: Arc<dyn DocumentApi>,
        fallback: Arc<dyn FallbackProvider>,
    ) -> Self {
        let dispatcher = Dispatcher::new(api.clone(), fallback.clone());
        let aggregator = Aggregator::new(dispatcher, config.limits.dispatch_concurrency);
        Self {
            config,
            api,
            fallback,
            aggregator,
        }
    }

    pub fn batch_limits(&self) -> UploadLimits {
        UploadLimits {
            max_files: self.config.limits.max_files,
            max_file_size_bytes: self.config.limits.max_file_size_bytes,
        }
    }

    pub fn single_file_limits(&self) -> UploadLimits {
        UploadLimits {
            max_files: 1,
            max_file_size_bytes: self.config.limits.max_file_size_bytes,
        }
    }
}
