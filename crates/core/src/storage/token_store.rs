use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::auth::TokenPair;

/// Persisted storage for the two credential slots, `access` and `refresh`.
///
/// Absence of a slot is a valid, meaningful state: no access token means
/// logged out. The store is the only durable side effect of the auth flow.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;

    /// Overwrite just the access token (successful refresh).
    fn set_access(&self, token: &str);

    /// Store both tokens (successful login).
    fn set_pair(&self, pair: &TokenPair);

    /// Drop only the access token (401 with no refresh token on hand).
    fn clear_access(&self);

    /// Drop both tokens (logout, or refresh failure).
    fn clear(&self);
}

// ── In-memory store ─────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Slots {
    access: Option<String>,
    refresh: Option<String>,
}

/// Ephemeral token store for tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slots: Mutex<Slots>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with tokens already present (e.g. a restored session).
    #[must_use]
    pub fn with_pair(pair: TokenPair) -> Self {
        Self {
            slots: Mutex::new(Slots {
                access: Some(pair.access),
                refresh: Some(pair.refresh),
            }),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).refresh.clone()
    }

    fn set_access(&self, token: &str) {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).access = Some(token.to_string());
    }

    fn set_pair(&self, pair: &TokenPair) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.access = Some(pair.access.clone());
        slots.refresh = Some(pair.refresh.clone());
    }

    fn clear_access(&self) {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).access = None;
    }

    fn clear(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.access = None;
        slots.refresh = None;
    }
}

// ── File-backed store ───────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
struct TokenFile {
    access: Option<String>,
    refresh: Option<String>,
}

/// Durable token store backed by a small JSON file.
///
/// The file is read once at open and rewritten on every mutation; reads are
/// served from the in-memory copy. A missing file is the logged-out state.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    slots: Mutex<Slots>,
}

impl FileTokenStore {
    /// Open (or initialize) a token store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        let slots = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let file: TokenFile = serde_json::from_str(&contents)?;
            Slots {
                access: file.access,
                refresh: file.refresh,
            }
        } else {
            Slots::default()
        };
        Ok(Self {
            path,
            slots: Mutex::new(slots),
        })
    }

    fn persist(&self, slots: &Slots) {
        let file = TokenFile {
            access: slots.access.clone(),
            refresh: slots.refresh.clone(),
        };
        let result = serde_json::to_string_pretty(&file)
            .map_err(CoreError::from)
            .and_then(|json| std::fs::write(&self.path, json).map_err(CoreError::from));
        if let Err(e) = result {
            // Token mutations must not fail the request that triggered them;
            // worst case the session does not survive a restart.
            tracing::warn!(path = %self.path.display(), error = %e, "failed to persist tokens");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).refresh.clone()
    }

    fn set_access(&self, token: &str) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.access = Some(token.to_string());
        self.persist(&slots);
    }

    fn set_pair(&self, pair: &TokenPair) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.access = Some(pair.access.clone());
        slots.refresh = Some(pair.refresh.clone());
        self.persist(&slots);
    }

    fn clear_access(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.access = None;
        self.persist(&slots);
    }

    fn clear(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.access = None;
        slots.refresh = None;
        self.persist(&slots);
    }
}
