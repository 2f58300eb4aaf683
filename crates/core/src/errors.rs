use thiserror::Error;

/// Unified error type for the entire trading-dashboard-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
///
/// The P&L aggregator never produces one of these: malformed operations
/// are skipped, not reported.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The backend answered 401. The caller should send the user to `login_url`.
    #[error("Not authenticated, log in at {login_url}")]
    Unauthorized { login_url: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Configuration ───────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl CoreError {
    /// True when the error means the session is gone and the user must log in again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CoreError::Unauthorized { .. })
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(e: toml::de::Error) -> Self {
        CoreError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        let msg = sanitize_url_message(&e.to_string());
        if e.is_decode() {
            CoreError::Deserialization(msg)
        } else {
            CoreError::Network(msg)
        }
    }
}

/// Strip query parameters from a message that may contain a URL, so tokens
/// passed as query strings never end up in logs or user-facing errors.
pub fn sanitize_url_message(msg: &str) -> String {
    match msg.find('?') {
        Some(idx) => format!("{}?<query redacted>", &msg[..idx]),
        None => msg.to_string(),
    }
}
