//! SMS rate batch update.

use serde::{Deserialize, Serialize};

use super::{ApiError, Session, ensure_success};

/// One replacement rate row submitted to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateRow {
    pub rate_start_date: String,
    pub rate_end_date: String,
    pub mccmnc: String,
    pub rate: u32,
}

/// Batch update request body.
#[derive(Debug, Serialize)]
struct UpdateReq<'a> {
    product_id: i64,
    rows: &'a [RateRow],
}

/// Summary returned by the platform after a batch update.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReport {
    #[serde(default)]
    pub mini_report: String,
}

/// Apply a batch of rate rows to one product in a single call.
///
/// The update is all-or-nothing at the endpoint; a non-2xx answer means
/// nothing was applied.
pub async fn update_sms_rate(
    session: &Session,
    product_id: i64,
    rows: &[RateRow],
) -> Result<UpdateReport, ApiError> {
    let url = session.endpoint("sms_rate")?;
    let body = UpdateReq { product_id, rows };
    let resp = session
        .http
        .post(url)
        .bearer_auth(&session.token)
        .json(&body)
        .send()
        .await?;
    let resp = ensure_success(resp).await?;
    Ok(resp.json::<UpdateReport>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alaris::auth;
    use crate::config::Config;
    use reqwest::Client;

    fn test_config(base: &str) -> Config {
        Config {
            alaris_domain: base.to_string(),
            alaris_user: "user".into(),
            alaris_password: "secret".into(),
            eapi_url: String::new(),
            eapi_auth: String::new(),
            tg_token: String::new(),
            tg_chat_id: String::new(),
            reference_product_id: 14023,
            log_dir: ".".into(),
            log_level: "info".into(),
        }
    }

    #[tokio::test]
    async fn test_update_posts_rows_and_returns_report() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/sms_rate")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "product_id": 14023,
                "rows": [{
                    "rate_start_date": "2024-01-01",
                    "rate_end_date": "2024-02-01",
                    "mccmnc": "21201",
                    "rate": 0
                }]
            })))
            .with_body(r#"{"mini_report":"1 row updated"}"#)
            .create_async()
            .await;

        let http = Client::new();
        let session = auth::open_session(&http, &test_config(&server.url()), "t".into()).unwrap();
        let rows = vec![RateRow {
            rate_start_date: "2024-01-01".into(),
            rate_end_date: "2024-02-01".into(),
            mccmnc: "21201".into(),
            rate: 0,
        }];
        let report = update_sms_rate(&session, 14023, &rows).await.unwrap();
        m.assert_async().await;
        assert_eq!(report.mini_report, "1 row updated");
    }
}
