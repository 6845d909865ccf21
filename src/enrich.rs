//! Enrichment of filtered tasks with human-readable context.

use crate::alaris::reference::ReferenceData;
use crate::rerating::FilteredTask;

/// Fallback text for parameters the task did not carry.
const UNDEFINED: &str = "undefined";

/// Resolve a task status code into its display text.
pub fn status_text(code: i32) -> &'static str {
    match code {
        0 => "ready",
        1 => "new",
        2 => "error",
        3 => "aborted",
        4 => "scheduled",
        5 => "pending",
        6 => "waiting",
        7 => "in_process",
        _ => UNDEFINED,
    }
}

/// A product-ids parameter resolved for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caption {
    /// A fixed text ("All products", "undefined", ...).
    Text(String),
    /// One resolved caption per requested product id, input order.
    List(Vec<String>),
}

/// Fully human-readable report record for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedTask {
    pub task_id: i64,
    pub status: &'static str,
    pub start_time: String,
    pub last_update_time: String,
    pub src_products: Caption,
    pub dst_products: Caption,
    pub rerating_start_time: String,
    pub rerating_end_time: String,
}

/// Join one filtered task against the reference data snapshot.
pub fn enrich(filtered: &FilteredTask, refdata: &ReferenceData) -> EnrichedTask {
    let task = &filtered.task;
    let params = &filtered.params;

    // The parameter takes precedence; the task's own start time covers
    // tasks scheduled for immediate execution.
    let start_time = match params.task_start_time.as_deref() {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => task.start_time.clone(),
    };

    EnrichedTask {
        task_id: task.id,
        status: status_text(task.status),
        start_time,
        last_update_time: task.last_update_time.clone(),
        src_products: products_caption(params.src_product_ids.as_deref(), refdata),
        dst_products: products_caption(params.dst_product_ids.as_deref(), refdata),
        rerating_start_time: param_or_undefined(params.start_date.as_deref()),
        rerating_end_time: param_or_undefined(params.end_date.as_deref()),
    }
}

fn param_or_undefined(value: Option<&str>) -> String {
    value.unwrap_or(UNDEFINED).to_string()
}

/// Resolve a comma-separated product-ids parameter into a caption.
fn products_caption(ids: Option<&str>, refdata: &ReferenceData) -> Caption {
    match ids {
        None => Caption::Text(UNDEFINED.into()),
        Some("") => Caption::Text("All products".into()),
        Some("0") => Caption::Text("include undefined products".into()),
        Some(ids) => Caption::List(
            ids.split(',')
                .map(|id| product_caption(id.trim(), refdata))
                .collect(),
        ),
    }
}

/// Build `"<carrier> - <description>(<currency>)"` for one product id.
///
/// A dangling product, carrier or account reference yields a placeholder
/// caption instead of failing the batch.
fn product_caption(product_id: &str, refdata: &ReferenceData) -> String {
    let Ok(id) = product_id.parse::<i64>() else {
        tracing::warn!("product id {product_id:?} is not numeric");
        return format!("unresolved product {product_id}");
    };
    let Some(product) = refdata.products.iter().find(|p| p.id == id) else {
        tracing::warn!("product {id} not found in reference data");
        return format!("unresolved product {id}");
    };
    let carrier = refdata.carriers.iter().find(|c| c.id == product.car_id);
    let account = refdata.accounts.iter().find(|a| a.id == product.acc_id);
    match (carrier, account) {
        (Some(carrier), Some(account)) => {
            format!("{} - {}({})", carrier.name, product.descr, account.currency_code)
        }
        _ => {
            tracing::warn!(
                "product {id}: carrier {} or account {} missing from reference data",
                product.car_id,
                product.acc_id
            );
            format!("unresolved product {id}")
        }
    }
}
