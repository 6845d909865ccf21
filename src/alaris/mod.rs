//! Billing platform REST API client.

pub mod auth;
pub mod rates;
pub mod reference;
pub mod tasks;

use reqwest::{Client, StatusCode, Url};
use thiserror::Error;

/// Errors produced by the platform client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The platform rejected the bearer token as expired.
    #[error("token is expired")]
    TokenExpired,

    /// Any other non-2xx answer from the platform.
    #[error("HTTP status {status} error: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Authenticated HTTP context for one run.
///
/// Owns the shared client, the parsed base URL and the bearer token.
/// The token is replaced in place when the fetch wrapper re-authenticates.
pub struct Session {
    pub(crate) http: Client,
    pub(crate) base: Url,
    pub(crate) token: String,
}

impl Session {
    /// Resolve an endpoint path against the platform base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    /// Replace the bearer token after a re-authentication.
    pub(crate) fn set_token(&mut self, token: String) {
        self.token = token;
    }
}

/// Convert non-2xx responses into a structured error.
///
/// A 426 whose body carries `error_message == "Token is expired"` is the
/// platform's token-expiry signal and maps to [`ApiError::TokenExpired`].
pub(crate) async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_else(|_| "".into());
    if status == StatusCode::UPGRADE_REQUIRED && is_token_expired(&body) {
        return Err(ApiError::TokenExpired);
    }
    Err(ApiError::Status { status, body })
}

/// Check an error body for the expired-token marker.
fn is_token_expired(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error_message")
                .and_then(|m| m.as_str())
                .map(|m| m == "Token is expired")
        })
        .unwrap_or(false)
}
