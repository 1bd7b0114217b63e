use std::sync::Arc;

use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::auth::{Credentials, RefreshRequest, RefreshResponse, Registration, TokenPair};
use crate::models::prediction::{RegressionMetrics, RemotePrediction};
use crate::models::settings::PortalSettings;
use crate::services::session::SessionStore;
use crate::storage::token_store::TokenStore;

/// JSON API client with bearer-token attachment and a single
/// refresh-and-retry cycle on 401.
///
/// Per logical request: attach the stored access token, send, and on the
/// first 401 exchange the refresh token for a new access token and resend
/// once. A 401 on the resend, any other 4xx/5xx, and transport failures are
/// surfaced to the caller unchanged. When refresh is impossible (no refresh
/// token) or fails, the stored tokens are cleared and the shared
/// [`SessionStore`] flips to logged-out, notifying its subscribers.
///
/// Concurrent 401s coalesce: refreshes serialize on an async mutex, and a
/// waiter that finds the stored access token already changed from the one
/// its failed request carried reuses it instead of issuing its own refresh
/// call. At most one refresh is in flight per token generation.
pub struct ApiClient {
    http: Client,
    base_url: String,
    backend_root: String,
    tokens: Arc<dyn TokenStore>,
    session: Arc<SessionStore>,
    refresh_gate: tokio::sync::Mutex<()>,
}

impl ApiClient {
    pub fn new(
        settings: &PortalSettings,
        tokens: Arc<dyn TokenStore>,
        session: Arc<SessionStore>,
    ) -> Self {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            backend_root: settings.backend_root.trim_end_matches('/').to_string(),
            tokens,
            session,
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    // ── Auth endpoints ──────────────────────────────────────────────

    /// Exchange credentials for a token pair via `POST /token/`.
    ///
    /// Sent unauthenticated and without the refresh retry: a 401 here means
    /// bad credentials, not an expired access token.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), CoreError> {
        let body = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.send(&Method::POST, "/token/", Some(&body), None).await?;
        let pair: TokenPair = Self::decode("/token/", response).await?;
        self.tokens.set_pair(&pair);
        self.session.set_logged_in();
        Ok(())
    }

    /// Create an account via `POST /register/`. The response body is not
    /// inspected beyond its status.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), CoreError> {
        let body = Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .send(&Method::POST, "/register/", Some(&body), None)
            .await?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(CoreError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    /// Clear both tokens and flip the session to logged-out.
    pub fn logout(&self) {
        self.tokens.clear();
        self.session.set_logged_out();
    }

    /// Auth liveness probe: `GET /protected-view/`.
    pub async fn check_auth(&self) -> Result<(), CoreError> {
        let _: serde_json::Value = self
            .request_with_retry(Method::GET, "/protected-view/", None::<&()>)
            .await?;
        Ok(())
    }

    // ── Prediction endpoint ─────────────────────────────────────────

    /// Request a prediction for `ticker` via `POST /predict/`.
    ///
    /// A 2xx reply carrying `{error}` means the backend has no data for the
    /// ticker and maps to [`CoreError::NoData`]. Relative plot paths are
    /// resolved against the configured backend root.
    pub async fn predict(&self, ticker: &str) -> Result<RemotePrediction, CoreError> {
        let body = serde_json::json!({ "ticker": ticker });
        let raw: PredictResponseRaw = self
            .request_with_retry(Method::POST, "/predict/", Some(&body))
            .await?;

        if raw.error.is_some() {
            return Err(CoreError::NoData(ticker.to_string()));
        }

        let metric = |name: &str, value: Option<f64>| {
            value.ok_or_else(|| CoreError::Api {
                endpoint: "/predict/".to_string(),
                message: format!("missing field `{name}` in prediction response"),
            })
        };

        Ok(RemotePrediction {
            metrics: RegressionMetrics {
                mse: metric("mse", raw.mse)?,
                rmse: metric("rmse", raw.rmse)?,
                r2: metric("r2", raw.r2)?,
            },
            plot_img: self.resolve_image_url(raw.plot_img.unwrap_or_default()),
            plot_100_dma: self.resolve_image_url(raw.plot_100_dma.unwrap_or_default()),
            plot_200_dma: self.resolve_image_url(raw.plot_200_dma.unwrap_or_default()),
            plot_prediction: self.resolve_image_url(raw.plot_prediction.unwrap_or_default()),
        })
    }

    // ── Request machinery ───────────────────────────────────────────

    /// Perform an authenticated request with the retry-once-on-401 cycle.
    ///
    /// The retry is structural — the request is sent at most twice in
    /// straight-line code — rather than tracked with a mutable flag on a
    /// shared request object, so the retry-once invariant is visible here.
    async fn request_with_retry<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, CoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let stale = self.tokens.access_token();
        let response = self.send(&method, path, body, stale.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::decode(path, response).await;
        }

        let fresh = self.refresh_access_token(stale.as_deref()).await?;
        let retry = self.send(&method, path, body, Some(&fresh)).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            // Second 401 on the retried request is terminal.
            return Err(CoreError::Unauthorized);
        }
        Self::decode(path, retry).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: &Method,
        path: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, CoreError> {
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(CoreError::Http {
                status: status.as_u16(),
                message,
            });
        }
        response.json::<T>().await.map_err(|e| CoreError::Api {
            endpoint: path.to_string(),
            message: format!("failed to decode response: {e}"),
        })
    }

    /// Exchange the refresh token for a new access token, coalescing
    /// concurrent attempts.
    ///
    /// `stale` is the access token the failed request carried. After
    /// acquiring the gate, a stored token differing from `stale` means
    /// another request already refreshed — reuse it without a network call.
    ///
    /// On the forced-logout paths the token mutation and the session flip
    /// have no await point between them, so no reader observes a cleared
    /// token with a stale logged-in flag.
    async fn refresh_access_token(&self, stale: Option<&str>) -> Result<String, CoreError> {
        let _gate = self.refresh_gate.lock().await;

        if let Some(current) = self.tokens.access_token() {
            if stale != Some(current.as_str()) {
                return Ok(current);
            }
        }

        let refresh = match self.tokens.refresh_token() {
            Some(token) => token,
            None => {
                self.tokens.clear_access();
                self.session.set_logged_out();
                return Err(CoreError::NoRefreshToken);
            }
        };

        tracing::debug!("access token rejected, exchanging refresh token");
        let url = format!("{}/token/refresh/", self.base_url);
        let outcome = async {
            let response = self
                .http
                .post(&url)
                .json(&RefreshRequest { refresh })
                .send()
                .await
                .map_err(|e| CoreError::RefreshFailed(CoreError::from(e).to_string()))?;
            let status = response.status();
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(CoreError::RefreshFailed(format!(
                    "refresh endpoint returned {status}: {message}"
                )));
            }
            let body: RefreshResponse = response.json().await.map_err(|e| {
                CoreError::RefreshFailed(format!("undecodable refresh response: {e}"))
            })?;
            Ok(body.access)
        }
        .await;

        match outcome {
            Ok(access) => {
                self.tokens.set_access(&access);
                Ok(access)
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed, forcing logout");
                self.tokens.clear();
                self.session.set_logged_out();
                Err(e)
            }
        }
    }

    fn resolve_image_url(&self, path: String) -> String {
        if path.is_empty()
            || path.starts_with("data:")
            || path.starts_with("http")
            || self.backend_root.is_empty()
        {
            return path;
        }
        format!("{}{}", self.backend_root, path)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("logged_in", &self.session.is_logged_in())
            .finish()
    }
}

/// Raw `/predict/` response: either the metric/plot fields or `{error}`.
#[derive(Debug, Deserialize)]
struct PredictResponseRaw {
    error: Option<String>,
    mse: Option<f64>,
    rmse: Option<f64>,
    r2: Option<f64>,
    plot_img: Option<String>,
    plot_100_dma: Option<String>,
    plot_200_dma: Option<String>,
    plot_prediction: Option<String>,
}
