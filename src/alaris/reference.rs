//! Run-scoped reference data used for name resolution.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{ApiError, Session, ensure_success};

/// Product row from the `product` collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(default)]
    pub descr: String,
    /// Owning carrier id.
    #[serde(default)]
    pub car_id: i64,
    /// Billing account id, carries the currency.
    #[serde(default)]
    pub acc_id: i64,
}

/// Carrier row from the `carrier` collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Carrier {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// Account row from the `account` collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: i64,
    #[serde(default)]
    pub currency_code: String,
}

/// Full snapshot of the three collections, fetched once per run.
#[derive(Debug)]
pub struct ReferenceData {
    pub products: Vec<Product>,
    pub carriers: Vec<Carrier>,
    pub accounts: Vec<Account>,
}

/// Load products, carriers and accounts for enrichment joins.
///
/// Callers defer this until at least one task has survived filtering, so
/// empty runs never pay for the three collection fetches.
pub async fn load_reference_data(session: &Session) -> Result<ReferenceData, ApiError> {
    let products = fetch_collection(session, "product").await?;
    let carriers = fetch_collection(session, "carrier").await?;
    let accounts = fetch_collection(session, "account").await?;
    tracing::debug!(
        "reference data loaded: {} products, {} carriers, {} accounts",
        products.len(),
        carriers.len(),
        accounts.len()
    );
    Ok(ReferenceData {
        products,
        carriers,
        accounts,
    })
}

/// Fetch one full collection from the platform.
async fn fetch_collection<T: DeserializeOwned>(
    session: &Session,
    path: &str,
) -> Result<Vec<T>, ApiError> {
    let url = session.endpoint(path)?;
    let resp = session
        .http
        .get(url)
        .bearer_auth(&session.token)
        .send()
        .await?;
    let resp = ensure_success(resp).await?;
    Ok(resp.json::<Vec<T>>().await?)
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
    async fn test_loads_all_three_collections() {
        let mut server = mockito::Server::new_async().await;
        let products = server
            .mock("GET", "/product")
            .with_body(r#"[{"id":1,"descr":"Retail Demo","car_id":10,"acc_id":20}]"#)
            .create_async()
            .await;
        let carriers = server
            .mock("GET", "/carrier")
            .with_body(r#"[{"id":10,"name":"Acme Telecom"}]"#)
            .create_async()
            .await;
        let accounts = server
            .mock("GET", "/account")
            .with_body(r#"[{"id":20,"currency_code":"EUR"}]"#)
            .create_async()
            .await;

        let http = Client::new();
        let session = auth::open_session(&http, &test_config(&server.url()), "t".into()).unwrap();
        let data = load_reference_data(&session).await.unwrap();
        products.assert_async().await;
        carriers.assert_async().await;
        accounts.assert_async().await;
        assert_eq!(data.products[0].descr, "Retail Demo");
        assert_eq!(data.carriers[0].name, "Acme Telecom");
        assert_eq!(data.accounts[0].currency_code, "EUR");
    }

    #[tokio::test]
    async fn test_collection_failure_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        let _products = server
            .mock("GET", "/product")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let http = Client::new();
        let session = auth::open_session(&http, &test_config(&server.url()), "t".into()).unwrap();
        let err = load_reference_data(&session).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { .. }));
    }
}
