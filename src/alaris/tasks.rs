//! Rerating task fetch and the expiry-aware retry wrapper.

use serde::Deserialize;

use super::{ApiError, Session, auth, ensure_success};
use crate::config::Config;

/// One task row as returned by the `task` endpoint.
///
/// Only `id`, the status code and the last-update timestamp are guaranteed
/// by the platform; everything else defaults to empty when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: i64,
    #[serde(rename = "task_status")]
    pub status: i32,
    #[serde(rename = "task_last_update_time")]
    pub last_update_time: String,
    #[serde(rename = "task_start_time", default)]
    pub start_time: String,
    #[serde(rename = "task_result", default)]
    pub result: String,
    #[serde(rename = "task_param_json", default)]
    pub param_json: String,
}

/// Fetch all tasks of the given type.
pub async fn fetch_tasks(session: &Session, task_type_id: u32) -> Result<Vec<Task>, ApiError> {
    let url = session.endpoint("task")?;
    let resp = session
        .http
        .get(url)
        .bearer_auth(&session.token)
        .query(&[("task_type_id", task_type_id.to_string())])
        .send()
        .await?;
    let resp = ensure_success(resp).await?;
    Ok(resp.json::<Vec<Task>>().await?)
}

/// Fetch tasks, re-authenticating once if the token has expired.
///
/// The replacement token is stored back into the session so later calls in
/// the same run reuse it. A second failure of any kind propagates.
pub async fn fetch_tasks_with_reauth(
    cfg: &Config,
    session: &mut Session,
    task_type_id: u32,
) -> Result<Vec<Task>, ApiError> {
    match fetch_tasks(session, task_type_id).await {
        Err(ApiError::TokenExpired) => {
            tracing::warn!("token has expired, re-authenticating");
            let token = auth::get_token(&session.http, cfg).await?;
            session.set_token(token);
            fetch_tasks(session, task_type_id).await
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    async fn test_session(base: &str) -> Session {
        let http = Client::new();
        auth::open_session(&http, &test_config(base), "t0".into()).unwrap()
    }

    const TASK_BODY: &str = r#"[{
        "id": 7,
        "task_status": 0,
        "task_last_update_time": "2024.01.01 12:00:30",
        "task_start_time": "2024.01.01 11:59:00",
        "task_result": "ok",
        "task_param_json": "{}"
    }]"#;

    #[tokio::test]
    async fn test_fetch_tasks_parses_rows() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/task")
            .match_query(mockito::Matcher::UrlEncoded(
                "task_type_id".into(),
                "11".into(),
            ))
            .with_body(TASK_BODY)
            .create_async()
            .await;

        let session = test_session(&server.url()).await;
        let tasks = fetch_tasks(&session, 11).await.unwrap();
        m.assert_async().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, 7);
        assert_eq!(tasks[0].last_update_time, "2024.01.01 12:00:30");
    }

    #[tokio::test]
    async fn test_missing_optional_fields_default_to_empty() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/task")
            .match_query(mockito::Matcher::Any)
            .with_body(r#"[{"id":1,"task_status":5,"task_last_update_time":"2024.01.01 00:00:00"}]"#)
            .create_async()
            .await;

        let session = test_session(&server.url()).await;
        let tasks = fetch_tasks(&session, 11).await.unwrap();
        assert_eq!(tasks[0].start_time, "");
        assert_eq!(tasks[0].param_json, "");
    }

    #[tokio::test]
    async fn test_expired_token_retries_exactly_once() {
        let mut server = mockito::Server::new_async().await;
        // Expiry on every fetch: the wrapper must re-auth once, retry once,
        // then give up with the second expiry.
        let task_mock = server
            .mock("GET", "/task")
            .match_query(mockito::Matcher::Any)
            .with_status(426)
            .with_body(r#"{"error_message":"Token is expired"}"#)
            .expect(2)
            .create_async()
            .await;
        let auth_mock = server
            .mock("GET", "/auth")
            .with_body(r#"{"token":"t1"}"#)
            .expect(1)
            .create_async()
            .await;

        let cfg = test_config(&server.url());
        let mut session = test_session(&server.url()).await;
        let err = fetch_tasks_with_reauth(&cfg, &mut session, 11)
            .await
            .unwrap_err();
        task_mock.assert_async().await;
        auth_mock.assert_async().await;
        assert!(matches!(err, ApiError::TokenExpired));
        // The fresh token was installed before the retry.
        assert_eq!(session.token, "t1");
    }

    #[tokio::test]
    async fn test_other_http_failure_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let task_mock = server
            .mock("GET", "/task")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .expect(1)
            .create_async()
            .await;
        let auth_mock = server
            .mock("GET", "/auth")
            .expect(0)
            .create_async()
            .await;

        let cfg = test_config(&server.url());
        let mut session = test_session(&server.url()).await;
        let err = fetch_tasks_with_reauth(&cfg, &mut session, 11)
            .await
            .unwrap_err();
        task_mock.assert_async().await;
        auth_mock.assert_async().await;
        assert!(matches!(err, ApiError::Status { .. }));
    }
}
