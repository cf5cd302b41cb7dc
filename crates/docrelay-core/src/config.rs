//! Configuration module
//!
//! Process configuration is loaded once at startup and passed explicitly to the
//! components that need it (the document API client, the dispatcher and the
//! HTTP layer). Nothing reads the environment at request time.

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::str::FromStr;

// Common constants
const SERVER_PORT: u16 = 3001;
const NUTRIENT_API_BASE: &str = "https://api.nutrient.io";
const NUTRIENT_TIMEOUT_SECS: u64 = 30;
const MAX_FILE_SIZE_MB: usize = 50;
const MAX_FILES: usize = 5;
const DISPATCH_CONCURRENCY: usize = 1;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const DEMO_DASHBOARD_URL: &str = "https://dashboard.nutrient.io";
const DEMO_VIEWER_APPLICATION_ID: &str = "demo-application";
const DEMO_VIEWER_TOKEN: &str = "demo-viewer-token";
const DEMO_DOCUMENT_BASE_URL: &str = "https://api.nutrient.io/documents";

/// Connection settings for the external document API.
#[derive(Clone)]
pub struct NutrientConfig {
    pub api_base: String,
    pub processor_api_key: String,
    pub viewer_api_key: String,
    /// Domain used to build live viewer URLs when the session response has none.
    pub viewer_domain: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

// API keys must never reach the logs.
impl Debug for NutrientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("NutrientConfig")
            .field("api_base", &self.api_base)
            .field("processor_api_key", &"[redacted]")
            .field("viewer_api_key", &"[redacted]")
            .field("viewer_domain", &self.viewer_domain)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Values used by the demo fallback when the external API returns no document.
#[derive(Clone, Debug)]
pub struct DemoConfig {
    pub dashboard_url: String,
    pub application_id: String,
    pub viewer_token: String,
    pub document_base_url: String,
}

/// Upload and dispatch limits.
#[derive(Clone, Debug)]
pub struct LimitsConfig {
    pub max_file_size_bytes: usize,
    pub max_files: usize,
    /// Number of files dispatched at once within a batch. 1 = sequential.
    pub dispatch_concurrency: usize,
    pub http_concurrency_limit: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub nutrient: NutrientConfig,
    pub demo: DemoConfig,
    pub limits: LimitsConfig,
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = parse_or(lookup("PORT").or_else(|| lookup("SERVER_PORT")), SERVER_PORT);

        let processor_api_key = trimmed(lookup("NUTRIENT_PROCESSOR_API_KEY")).ok_or_else(|| {
            anyhow::anyhow!("NUTRIENT_PROCESSOR_API_KEY environment variable not set")
        })?;
        let viewer_api_key =
            trimmed(lookup("NUTRIENT_VIEWER_API_KEY")).unwrap_or_else(|| processor_api_key.clone());

        let api_base = trimmed(lookup("NUTRIENT_API_BASE"))
            .unwrap_or_else(|| NUTRIENT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        let viewer_domain = trimmed(lookup("NUTRIENT_VIEWER_DOMAIN"))
            .unwrap_or_else(|| api_base.clone())
            .trim_end_matches('/')
            .to_string();

        let nutrient = NutrientConfig {
            api_base,
            processor_api_key,
            viewer_api_key,
            viewer_domain,
            timeout_secs: parse_or(lookup("NUTRIENT_TIMEOUT_SECS"), NUTRIENT_TIMEOUT_SECS),
            user_agent: format!("docrelay/{}", env!("CARGO_PKG_VERSION")),
        };

        let demo = DemoConfig {
            dashboard_url: trimmed(lookup("DEMO_DASHBOARD_URL"))
                .unwrap_or_else(|| DEMO_DASHBOARD_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            application_id: trimmed(lookup("DEMO_VIEWER_APPLICATION_ID"))
                .unwrap_or_else(|| DEMO_VIEWER_APPLICATION_ID.to_string()),
            viewer_token: trimmed(lookup("DEMO_VIEWER_TOKEN"))
                .unwrap_or_else(|| DEMO_VIEWER_TOKEN.to_string()),
            document_base_url: trimmed(lookup("DEMO_DOCUMENT_BASE_URL"))
                .unwrap_or_else(|| DEMO_DOCUMENT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        };

        let max_file_size_mb = parse_or(lookup("MAX_FILE_SIZE_MB"), MAX_FILE_SIZE_MB);
        let limits = LimitsConfig {
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            max_files: parse_or(lookup("MAX_FILES"), MAX_FILES),
            dispatch_concurrency: parse_or(lookup("DISPATCH_CONCURRENCY"), DISPATCH_CONCURRENCY),
            http_concurrency_limit: parse_or(
                lookup("HTTP_CONCURRENCY_LIMIT"),
                HTTP_CONCURRENCY_LIMIT,
            ),
        };

        Ok(Config {
            server_port,
            environment,
            nutrient,
            demo,
            limits,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Fail fast on values that would only surface as confusing request-time errors.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.nutrient.api_base.starts_with("https://")
            || self.nutrient.api_base.starts_with("http://"))
        {
            return Err(anyhow::anyhow!(
                "NUTRIENT_API_BASE must be an http(s) URL, got '{}'",
                self.nutrient.api_base
            ));
        }

        if self.is_production() && !self.nutrient.api_base.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "NUTRIENT_API_BASE must use HTTPS in production"
            ));
        }

        if !self.demo.dashboard_url.starts_with("https://")
            || !self.demo.document_base_url.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "DEMO_DASHBOARD_URL and DEMO_DOCUMENT_BASE_URL must use HTTPS"
            ));
        }

        if self.nutrient.timeout_secs == 0 {
            return Err(anyhow::anyhow!("NUTRIENT_TIMEOUT_SECS cannot be 0"));
        }

        if self.limits.max_files == 0 {
            return Err(anyhow::anyhow!("MAX_FILES cannot be 0"));
        }

        if self.limits.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB cannot be 0"));
        }

        if self.limits.dispatch_concurrency == 0 {
            return Err(anyhow::anyhow!("DISPATCH_CONCURRENCY cannot be 0"));
        }

        Ok(())
    }
}
