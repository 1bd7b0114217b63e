use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default API base URL of the hosted backend.
pub const DEFAULT_BASE_URL: &str =
    "https://stock-prediction-portal-backend-hos.vercel.app/api/v1";

/// Default per-request timeout. Generous on purpose: the backend's
/// prediction computation can take minutes for an uncached ticker.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client configuration for the portal core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalSettings {
    /// API base URL, without a trailing slash (e.g. ".../api/v1")
    pub base_url: String,

    /// Root prepended to relative plot-image paths returned by `/predict/`.
    /// Empty means "use the paths as returned".
    pub backend_root: String,

    /// Per-request timeout
    #[serde(with = "timeout_secs")]
    pub request_timeout: Duration,

    /// Directory holding local `<TICKER>.csv` sample files
    pub data_dir: PathBuf,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            backend_root: String::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl PortalSettings {
    /// Build settings from the environment, falling back to defaults.
    ///
    /// Recognized variables: `STOCK_PORTAL_API_BASE_URL`,
    /// `STOCK_PORTAL_BACKEND_ROOT`, `STOCK_PORTAL_DATA_DIR`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(url) = std::env::var("STOCK_PORTAL_API_BASE_URL") {
            if !url.trim().is_empty() {
                settings.base_url = url.trim_end_matches('/').to_string();
            }
        }
        if let Ok(root) = std::env::var("STOCK_PORTAL_BACKEND_ROOT") {
            settings.backend_root = root.trim_end_matches('/').to_string();
        }
        if let Ok(dir) = std::env::var("STOCK_PORTAL_DATA_DIR") {
            if !dir.trim().is_empty() {
                settings.data_dir = PathBuf::from(dir);
            }
        }
        settings
    }
}

/// Serialize the timeout as whole seconds so settings files stay readable.
mod timeout_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}
