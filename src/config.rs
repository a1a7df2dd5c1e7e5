//! Environment-backed API configuration
//!
//! Credentials and endpoints come from the process environment, optionally
//! seeded from a `.env` file in the working directory (real environment
//! variables take precedence). Engine tunables are not configured here;
//! they travel in [`crate::core::runner::RunConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::types::EngineError;

const ENV_FILE: &str = ".env";

const DEFAULT_BASE_URL: &str = "https://api.atlassian.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STATE_DIR: &str = "logs";

/// Connection settings for the admin API plus local state paths
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the admin API
    pub base_url: String,

    /// Organization identifier (required)
    pub org_id: String,

    /// Bearer token for the admin API (required; never logged)
    pub api_key: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Directory for checkpoint files and run reports
    pub state_dir: PathBuf,
}

impl ApiConfig {
    /// Build the configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the missing variables when
    /// `ORG_ID` or `API_KEY` is absent or empty.
    pub fn from_env() -> Result<Self, EngineError> {
        let org_id = std::env::var("ORG_ID").unwrap_or_default();
        let api_key = std::env::var("API_KEY").unwrap_or_default();

        let mut missing = Vec::new();
        if org_id.trim().is_empty() {
            missing.push("ORG_ID");
        }
        if api_key.trim().is_empty() {
            missing.push("API_KEY");
        }
        if !missing.is_empty() {
            return Err(EngineError::configuration(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let base_url = std::env::var("API_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("TIMEOUT")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let state_dir = std::env::var("LOGS_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STATE_DIR.to_string());

        Ok(ApiConfig {
            base_url,
            org_id: org_id.trim().to_string(),
            api_key: api_key.trim().to_string(),
            timeout: Duration::from_secs(timeout_secs),
            state_dir: PathBuf::from(state_dir),
        })
    }
}

/// Load a `.env` file into the process environment
///
/// Real environment variables take precedence. Missing file is fine.
pub fn load_env_file() {
    let path = Path::new(ENV_FILE);
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return,
    };
    // Strip BOM if present (common on Windows-created files)
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    for line in content.lines() {
        let line = line.trim().trim_matches('\r');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }
}
