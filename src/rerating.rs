//! Rerating task filtering and the watch pipeline.

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, TimeDelta, Timelike, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::alaris::tasks::{self, Task};
use crate::alaris::{auth, reference};
use crate::config::Config;
use crate::enrich::{EnrichedTask, enrich};

/// Task type of rerating tasks on the platform.
pub const RERATING_TASK_TYPE_ID: u32 = 11;

/// Timestamp format used by the task endpoint.
const LAST_UPDATE_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

/// Prefix the platform writes into `task_result` while a task still runs.
const IN_PROGRESS_MARKER: &str = "in progress:";

/// Errors raised while filtering the task list.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("task {task_id}: malformed last_update_time {value:?}")]
    MalformedTimestamp {
        task_id: i64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Parameters embedded in a task as a JSON string.
///
/// Every key is optional; tasks created through different platform screens
/// carry different subsets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskParams {
    pub autorerating: Option<String>,
    pub dst_product_ids: Option<String>,
    pub src_product_ids: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub task_start_time: Option<String>,
}

/// A task that survived filtering, with its parameters parsed.
#[derive(Debug, Clone)]
pub struct FilteredTask {
    pub task: Task,
    pub params: TaskParams,
}

/// Select manual rerating tasks updated inside the trailing window.
///
/// The window is the half-open interval `[now - window, now)` with `now`
/// truncated to the minute, so a task updated exactly at `now` belongs to
/// the next run. Tasks still in progress, tasks with unparsable parameters
/// and automatic reratings are dropped; a malformed last-update timestamp
/// is an error. Output preserves input order.
pub fn filter_tasks(
    tasks: Vec<Task>,
    window: TimeDelta,
    now: NaiveDateTime,
) -> Result<Vec<FilteredTask>, FilterError> {
    let end_time = truncate_to_minute(now);
    let start_time = end_time - window;

    let mut selected = Vec::new();
    for task in tasks {
        let last_update = NaiveDateTime::parse_from_str(&task.last_update_time, LAST_UPDATE_FORMAT)
            .map_err(|source| FilterError::MalformedTimestamp {
                task_id: task.id,
                value: task.last_update_time.clone(),
                source,
            })?;
        if !(start_time <= last_update && last_update < end_time) {
            continue;
        }
        if task.result.contains(IN_PROGRESS_MARKER) {
            continue;
        }
        let params = match serde_json::from_str::<TaskParams>(&task.param_json) {
            Ok(params) => params,
            Err(e) => {
                tracing::debug!("task {}: unparsable task_param_json, skipped: {e}", task.id);
                continue;
            }
        };
        // TODO tasks without the autorerating key need a dedicated handler.
        let Some(autorerating) = params.autorerating.as_deref() else {
            tracing::debug!("task {}: no autorerating key, skipped", task.id);
            continue;
        };
        if autorerating == "1" {
            continue;
        }
        selected.push(FilteredTask { task, params });
    }
    Ok(selected)
}

/// Drop seconds and sub-second precision from a timestamp.
fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

/// Run the whole watch pipeline and return the enriched batch.
///
/// Reference data is loaded only after at least one task has survived
/// filtering.
pub async fn run(cfg: &Config, window: TimeDelta) -> Result<Vec<EnrichedTask>> {
    let http = Client::new();
    let token = auth::get_token(&http, cfg)
        .await
        .context("authentication failed")?;
    let mut session = auth::open_session(&http, cfg, token)?;

    let tasks = tasks::fetch_tasks_with_reauth(cfg, &mut session, RERATING_TASK_TYPE_ID)
        .await
        .context("task fetch failed")?;
    tracing::debug!("count of tasks for filtering: {}", tasks.len());

    let filtered = filter_tasks(tasks, window, Utc::now().naive_utc())?;
    if filtered.is_empty() {
        tracing::info!("no manual rerating tasks updated in the window");
        return Ok(Vec::new());
    }
    tracing::info!("{} tasks selected for reporting", filtered.len());

    let refdata = reference::load_reference_data(&session)
        .await
        .context("reference data load failed")?;
    Ok(filtered.iter().map(|t| enrich(t, &refdata)).collect())
}
