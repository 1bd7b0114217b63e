use thiserror::Error;

/// Unified error type for the entire stock-portal-core library.
/// Every public fallible function returns `Result<T, CoreError>`.
///
/// Numeric degeneracy (empty or constant series fed to the analytics
/// functions) is deliberately NOT represented here: those functions stay
/// total and propagate `None`/`NaN` sentinels instead.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Transport ───────────────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    // ── Auth ────────────────────────────────────────────────────────
    /// A 401 that survived the single refresh-and-retry cycle.
    #[error("Unauthorized — session expired")]
    Unauthorized,

    /// A 401 arrived but no refresh token is stored; no refresh was attempted.
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The token-refresh exchange itself failed.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    // ── API / HTTP ──────────────────────────────────────────────────
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("API error ({endpoint}): {message}")]
    Api { endpoint: String, message: String },

    /// The backend answered 2xx but reported it has no data for the ticker.
    #[error("No prediction data available for {0}")]
    NoData(String),

    // ── Local data ──────────────────────────────────────────────────
    #[error("CSV parse error: {0}")]
    Csv(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    // ── Caller input ────────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::Csv(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return CoreError::Timeout;
        }
        // Sanitize error message: strip query parameters from URLs so
        // tokens or credentials never end up in logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
