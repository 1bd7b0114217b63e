use serde::{Deserialize, Serialize};

/// The access/refresh token pair issued by the login exchange.
///
/// The access token is short-lived and attached to every authenticated
/// request; the refresh token is longer-lived and used exclusively to obtain
/// a new access token. Expiry is discovered reactively via a 401 response —
/// the client never inspects the tokens themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Login request body for `POST /token/`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Registration request body for `POST /register/`.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST /token/refresh/`.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Response body of `POST /token/refresh/`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}
