//! Telegram notification for enriched rerating tasks.

use anyhow::{Result, anyhow};
use reqwest::Client;

use crate::config::Config;
use crate::enrich::{Caption, EnrichedTask};

/// Continuation-line padding aligning products under the first entry.
const PRODUCT_INDENT: &str = "                         ";

/// Post one HTML-formatted message to the configured chat.
pub async fn send_message(http: &Client, cfg: &Config, text: &str) -> Result<()> {
    let url = format!("https://api.telegram.org/bot{}/sendMessage", cfg.tg_token);
    let body = serde_json::json!({
        "chat_id": cfg.tg_chat_id,
        "text": text,
        "parse_mode": "html",
    });
    let resp = http.post(url).json(&body).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_else(|_| "".into());
        return Err(anyhow!("telegram sendMessage failed: {status}: {body}"));
    }
    Ok(())
}

/// Render one enriched task as an HTML message.
pub fn format_task(task: &EnrichedTask) -> String {
    format!(
        "<b>task id</b>: {}\n\
         <b>status</b>: {}\n\
         <b>task start time</b>: {}\n\
         <b>last update time</b>: {}\n\
         {}{}<b>rerating period</b>: from {} till {}",
        task.task_id,
        task.status,
        task.start_time,
        task.last_update_time,
        format_products(&task.src_products, "src"),
        format_products(&task.dst_products, "dst"),
        task.rerating_start_time,
        task.rerating_end_time,
    )
}

/// Render a product caption block, one product per line.
fn format_products(caption: &Caption, direction: &str) -> String {
    match caption {
        Caption::Text(text) => format!("<b>{direction} products</b>: {text}\n"),
        Caption::List(products) => {
            let mut block = String::new();
            for (i, product) in products.iter().enumerate() {
                if i == 0 {
                    block.push_str(&format!("<b>{direction} products</b>: {product}\n"));
                } else {
                    block.push_str(&format!("{PRODUCT_INDENT}{product}\n"));
                }
            }
            block
        }
    }
}
