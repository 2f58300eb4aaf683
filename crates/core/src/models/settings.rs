use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::CoreError;

/// Environment variables that override file settings.
pub const ENV_API_URL: &str = "TDASH_API_URL";
pub const ENV_API_TOKEN: &str = "TDASH_API_TOKEN";
pub const ENV_PAGE_SIZE: &str = "TDASH_PAGE_SIZE";
pub const ENV_TIMEOUT_SECS: &str = "TDASH_TIMEOUT_SECS";

/// Connection and display settings for the dashboard client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend origin, e.g. "https://trade.example.com"
    pub api_base_url: String,

    /// Path prefix prepended to every API path (e.g. "/api")
    pub api_prefix: String,

    /// Where the user is sent when the backend answers 401
    pub login_path: String,

    /// Bearer token attached to every request, if any
    pub auth_token: Option<String>,

    pub request_timeout_secs: u64,

    /// Default number of rows per page in list views
    pub page_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            api_prefix: "/api".to_string(),
            login_path: "/login".to_string(),
            auth_token: None,
            request_timeout_secs: 30,
            page_size: 10,
        }
    }
}

impl Settings {
    /// Parse settings from TOML. Missing keys take their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, CoreError> {
        let settings: Settings = toml::from_str(input)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and parse a TOML settings file (native only).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply `TDASH_*` overrides from the process environment.
    pub fn apply_env_overrides(self) -> Result<Self, CoreError> {
        let vars: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with("TDASH_"))
            .collect();
        self.apply_overrides(&vars)
    }

    /// Apply overrides from an explicit map (same keys as the environment).
    pub fn apply_overrides(mut self, vars: &HashMap<String, String>) -> Result<Self, CoreError> {
        if let Some(url) = vars.get(ENV_API_URL) {
            self.api_base_url = url.clone();
        }
        if let Some(token) = vars.get(ENV_API_TOKEN) {
            self.auth_token = if token.is_empty() { None } else { Some(token.clone()) };
        }
        if let Some(raw) = vars.get(ENV_PAGE_SIZE) {
            self.page_size = raw.parse().map_err(|_| {
                CoreError::Config(format!("{ENV_PAGE_SIZE} must be a positive integer, got {raw:?}"))
            })?;
        }
        if let Some(raw) = vars.get(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = raw.parse().map_err(|_| {
                CoreError::Config(format!("{ENV_TIMEOUT_SECS} must be a positive integer, got {raw:?}"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.api_base_url.trim().is_empty() {
            return Err(CoreError::Config("api_base_url must not be empty".into()));
        }
        if self.page_size == 0 {
            return Err(CoreError::Config("page_size must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config("request_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    /// Absolute URL of the login page.
    pub fn login_url(&self) -> String {
        join_url(&self.api_base_url, &self.login_path)
    }

    /// Absolute URL of an API path, e.g. "/operations" → "{base}/api/operations".
    pub fn api_url(&self, path: &str) -> String {
        let prefix = join_url(&self.api_base_url, &self.api_prefix);
        join_url(&prefix, path)
    }
}

/// Join two URL pieces with exactly one slash between them.
fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}
