//! Enterprise reporting endpoint client (JSON-RPC style).

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;

/// Errors produced by the enterprise reporting client.
#[derive(Debug, Error)]
pub enum EapiError {
    /// The endpoint answered with a populated top-level `error` key.
    #[error("EAPI error: {0}")]
    Rpc(String),

    #[error("malformed EAPI response: {0}")]
    Malformed(String),

    #[error("HTTP status {status} error: {body}")]
    Status { status: StatusCode, body: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// One open rate row from the raw rate report.
///
/// Only the network code matters downstream; the rest of the row is
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRate {
    #[serde(default)]
    pub mccmnc: String,
}

#[derive(Debug, Deserialize)]
struct RpcResp {
    error: Option<RpcError>,
    result: Option<RpcResult>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResult {
    #[serde(default)]
    data: Vec<RawRate>,
}

/// Fetch the currently open rates for products, codes and a date range.
///
/// `product_list` and `mccmnc_list` are comma-separated filter strings;
/// an empty `mccmnc_list` means no code restriction.
pub async fn get_raw_sms_rates(
    http: &Client,
    cfg: &Config,
    product_list: &str,
    start_date: &str,
    end_date: &str,
    mccmnc_list: &str,
) -> Result<Vec<RawRate>, EapiError> {
    let payload = serde_json::json!({
        "id": 1,
        "jsonrpc": "2.0",
        "method": "Enterprise.Auto",
        "params": {
            "name": "get_raw_sms_rate_list",
            "args": {
                "product_list": product_list,
                "start_date": start_date,
                "end_date": end_date,
                "mccmnc_list": mccmnc_list,
            },
            "auth": cfg.eapi_auth,
        },
    });

    let resp = http.post(&cfg.eapi_url).json(&payload).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_else(|_| "".into());
        return Err(EapiError::Status { status, body });
    }

    let resp = resp.json::<RpcResp>().await?;
    if let Some(err) = resp.error {
        return Err(EapiError::Rpc(err.message));
    }
    let result = resp
        .result
        .ok_or_else(|| EapiError::Malformed("missing result".into()))?;
    Ok(result.data)
}
