//! API path constants

pub const UPLOAD_PATH: &str = "/api/upload";
pub const EXTRACT_PATH: &str = "/api/extract";
pub const PROCESS_PATH: &str = "/api/process";
pub const HEALTH_PATH: &str = "/api/health";
pub const OPENAPI_PATH: &str = "/api/openapi.json";
