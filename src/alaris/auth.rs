//! Token exchange and session construction.

use reqwest::{Client, Url};
use serde::Deserialize;

use super::{ApiError, Session, ensure_success};
use crate::config::Config;

/// Auth endpoint response.
#[derive(Debug, Deserialize)]
struct AuthResp {
    token: String,
}

/// Exchange basic credentials for a bearer token.
pub async fn get_token(http: &Client, cfg: &Config) -> Result<String, ApiError> {
    let url = base_url(cfg)?.join("auth")?;
    let resp = http
        .get(url)
        .basic_auth(&cfg.alaris_user, Some(&cfg.alaris_password))
        .send()
        .await?;
    let resp = ensure_success(resp).await?;
    let auth = resp.json::<AuthResp>().await?;
    Ok(auth.token)
}

/// Attach a bearer token to the shared client as a session.
pub fn open_session(http: &Client, cfg: &Config, token: String) -> Result<Session, ApiError> {
    Ok(Session {
        http: http.clone(),
        base: base_url(cfg)?,
        token,
    })
}

/// Parse the configured platform base URL.
fn base_url(cfg: &Config) -> Result<Url, ApiError> {
    Ok(Url::parse(&cfg.alaris_domain)?)
}
