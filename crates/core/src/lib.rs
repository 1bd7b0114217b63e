pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::path::Path;
use std::sync::Arc;

use errors::CoreError;
use models::prediction::{LocalAnalysis, PredictionReport, RemotePrediction};
use models::settings::PortalSettings;
use providers::local_csv::LocalCsvSource;
use providers::traits::StockDataSource;
use services::api_client::ApiClient;
use services::local_analysis::{analyze_series, AnalysisOptions};
use services::session::{SessionListener, SessionStore, SubscriptionId};
use storage::token_store::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Main entry point for the stock prediction portal client core.
///
/// Owns the authenticated API client, the shared session state, and the
/// local CSV sample source. The frontend renders; everything here computes.
#[must_use]
pub struct StockPortal {
    client: ApiClient,
    session: Arc<SessionStore>,
    local_data: LocalCsvSource,
    analysis_options: AnalysisOptions,
}

impl std::fmt::Debug for StockPortal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockPortal")
            .field("logged_in", &self.session.is_logged_in())
            .field("local_tickers", &self.local_data.available_tickers().len())
            .finish()
    }
}

impl StockPortal {
    /// Build a portal with an ephemeral in-memory token store.
    pub fn new(settings: PortalSettings) -> Self {
        Self::build(settings, Arc::new(MemoryTokenStore::new()))
    }

    /// Build a portal whose tokens persist in a JSON file, restoring the
    /// previous session when the file still holds an access token.
    pub fn with_token_file(
        settings: PortalSettings,
        token_path: impl AsRef<Path>,
    ) -> Result<Self, CoreError> {
        let store = FileTokenStore::open(token_path)?;
        Ok(Self::build(settings, Arc::new(store)))
    }

    /// Build a portal around a caller-provided token store.
    pub fn with_token_store(settings: PortalSettings, tokens: Arc<dyn TokenStore>) -> Self {
        Self::build(settings, tokens)
    }

    // ── Session ─────────────────────────────────────────────────────

    /// Exchange credentials for tokens; on success the session flips to
    /// logged-in and subscribers are notified.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), CoreError> {
        self.client.login(username, password).await
    }

    /// Create an account. Does not log in — follow with [`login`](Self::login).
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), CoreError> {
        self.client.register(username, email, password).await
    }

    /// Drop both tokens and flip the session to logged-out.
    pub fn logout(&self) {
        self.client.logout();
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    /// Subscribe to session transitions (login, logout, forced logout on
    /// refresh failure). Listeners fire synchronously with the new state.
    pub fn subscribe_session(&self, listener: SessionListener) -> SubscriptionId {
        self.session.subscribe(listener)
    }

    pub fn unsubscribe_session(&self, id: SubscriptionId) -> bool {
        self.session.unsubscribe(id)
    }

    /// Auth liveness probe against `/protected-view/`.
    pub async fn check_auth(&self) -> Result<(), CoreError> {
        self.client.check_auth().await
    }

    // ── Prediction ──────────────────────────────────────────────────

    /// The dashboard flow: prefer the local CSV sample when one exists,
    /// fall back to the remote prediction API otherwise (and when the local
    /// path fails, with a logged warning).
    pub async fn run_prediction(&self, ticker: &str) -> Result<PredictionReport, CoreError> {
        let symbol = normalize_ticker(ticker)?;

        if self.local_data.has_data(&symbol) {
            match self.analyze_symbol(&symbol).await {
                Ok(analysis) => return Ok(PredictionReport::Local(analysis)),
                Err(e) => {
                    tracing::warn!(
                        ticker = %symbol,
                        error = %e,
                        "local analysis failed, falling back to the prediction API"
                    );
                }
            }
        }

        let remote = self.client.predict(&symbol).await?;
        Ok(PredictionReport::Remote(remote))
    }

    /// Analyze a ticker's local CSV sample, bypassing the remote fallback.
    pub async fn analyze_local(&self, ticker: &str) -> Result<LocalAnalysis, CoreError> {
        let symbol = normalize_ticker(ticker)?;
        self.analyze_symbol(&symbol).await
    }

    /// Call the remote `/predict/` endpoint directly.
    pub async fn predict_remote(&self, ticker: &str) -> Result<RemotePrediction, CoreError> {
        let symbol = normalize_ticker(ticker)?;
        self.client.predict(&symbol).await
    }

    // ── Local data ──────────────────────────────────────────────────

    #[must_use]
    pub fn has_local_data(&self, ticker: &str) -> bool {
        self.local_data.has_data(ticker)
    }

    /// Tickers with a local CSV sample, sorted.
    #[must_use]
    pub fn available_local_tickers(&self) -> Vec<String> {
        self.local_data.available_tickers()
    }

    /// Replace the analysis tuning knobs (windows, sampling, split).
    pub fn set_analysis_options(&mut self, options: AnalysisOptions) {
        self.analysis_options = options;
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(settings: PortalSettings, tokens: Arc<dyn TokenStore>) -> Self {
        // Initial session state derives from token presence; expiry is only
        // ever discovered via a 401.
        let session = Arc::new(SessionStore::new(tokens.access_token().is_some()));
        let client = ApiClient::new(&settings, Arc::clone(&tokens), Arc::clone(&session));
        let local_data = LocalCsvSource::new(settings.data_dir.clone());

        Self {
            client,
            session,
            local_data,
            analysis_options: AnalysisOptions::default(),
        }
    }

    async fn analyze_symbol(&self, symbol: &str) -> Result<LocalAnalysis, CoreError> {
        let points = self.local_data.fetch(symbol).await?;
        analyze_series(&points, &self.analysis_options)
    }
}

fn normalize_ticker(ticker: &str) -> Result<String, CoreError> {
    let symbol = ticker.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(CoreError::Validation(
            "ticker symbol must not be empty".to_string(),
        ));
    }
    Ok(symbol)
}
