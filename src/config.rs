// src/config.rs

use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_SESSION_FILE: &str = "hrms_session.json";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Console configuration, read from `HRMS_`-prefixed environment variables.
/// Only the backend URL is mandatory.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL of the HRMS REST backend, e.g. `https://hrms.example.app/api`.
    pub api_url: String,

    /// Where the login flag lives between invocations.
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_session_file() -> PathBuf {
    PathBuf::from(DEFAULT_SESSION_FILE)
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        envy::prefixed("HRMS_").from_env::<AppConfig>()
    }
}
