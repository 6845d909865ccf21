//! Zero-rate reconciliation for the reference product.

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{Datelike, Months, NaiveDate};
use reqwest::Client;

use crate::alaris::auth;
use crate::alaris::rates::{self, RateRow, UpdateReport};
use crate::config::Config;
use crate::eapi;

/// Build one zero-valued replacement row per distinct network code.
///
/// Duplicates collapse onto their first occurrence, so row order follows
/// the first appearance of each code in the input.
pub fn collect_rate_list<I>(mccmncs: I, start_date: NaiveDate, end_date: NaiveDate) -> Vec<RateRow>
where
    I: IntoIterator<Item = String>,
{
    let start = start_date.to_string();
    let end = end_date.to_string();
    let mut seen = HashSet::new();
    mccmncs
        .into_iter()
        .filter(|code| seen.insert(code.clone()))
        .map(|mccmnc| RateRow {
            rate_start_date: start.clone(),
            rate_end_date: end.clone(),
            mccmnc,
            rate: 0,
        })
        .collect()
}

/// Default reconciliation window: the whole previous month.
pub fn default_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let end = today.with_day(1).unwrap_or(today);
    let start = end.checked_sub_months(Months::new(1)).unwrap_or(end);
    (start, end)
}

/// Zero out the open rates of the reference product over a date window.
///
/// Open rates come from the enterprise reporting endpoint, optionally
/// restricted to `codes`; the replacement batch goes to the platform rate
/// endpoint in one call. Running the same window twice is safe, rates are
/// only ever set to zero.
pub async fn run(
    cfg: &Config,
    start_date: NaiveDate,
    end_date: NaiveDate,
    codes: &[String],
) -> Result<UpdateReport> {
    let http = Client::new();
    let token = auth::get_token(&http, cfg)
        .await
        .context("authentication failed")?;
    let session = auth::open_session(&http, cfg, token)?;

    let product_list = cfg.reference_product_id.to_string();
    let raw_rates = eapi::get_raw_sms_rates(
        &http,
        cfg,
        &product_list,
        &start_date.to_string(),
        &end_date.to_string(),
        &codes.join(","),
    )
    .await
    .context("open rate fetch failed")?;
    tracing::debug!("rate count for update: {}", raw_rates.len());

    let rows = collect_rate_list(
        raw_rates.into_iter().map(|r| r.mccmnc),
        start_date,
        end_date,
    );
    if rows.is_empty() {
        tracing::info!("no open rates in the window, nothing to update");
        return Ok(UpdateReport::default());
    }

    let report = rates::update_sms_rate(&session, cfg.reference_product_id, &rows)
        .await
        .context("rate update failed")?;
    tracing::info!("{}", report.mini_report);
    Ok(report)
}
