//! Entry point: configuration, logging and command dispatch.

use anyhow::Result;
use chrono::{Local, NaiveDate, TimeDelta};
use clap::{Parser, Subcommand};
use envconfig::Envconfig;
use reqwest::Client;
use tracing_appender::non_blocking::WorkerGuard;

mod alaris;
mod config;
mod eapi;
mod enrich;
mod notify;
mod reconcile;
mod rerating;

use config::Config;

/// Collection of commands for working with SMS on the billing platform.
#[derive(Parser)]
#[command(name = "sms_ops")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report manually created rerating tasks updated in the trailing window.
    Rerating {
        /// Trailing window size in minutes.
        #[arg(long, default_value_t = 60)]
        window_minutes: u32,
    },
    /// Zero out open rates of the reference product over a date window.
    Rate {
        /// Window start (YYYY-MM-DD); defaults to the first day of the
        /// previous month.
        #[arg(long)]
        rate_start_date: Option<NaiveDate>,
        /// Window end (YYYY-MM-DD); defaults to the first day of the
        /// current month.
        #[arg(long)]
        rate_end_date: Option<NaiveDate>,
        /// Restrict the update to these network codes.
        #[arg(long, value_delimiter = ',')]
        codes: Vec<String>,
    },
}

/// Initialize file logging and keep the non-blocking guard alive.
fn init_logging(cfg: &Config) -> Result<WorkerGuard> {
    let log_file = "sms_ops.log";
    // One-shot runs append to a single file; rotation is left to the host.
    let file_appender = tracing_appender::rolling::never(&cfg.log_dir, log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = tracing_subscriber::EnvFilter::try_new(&cfg.log_level)
        .map_err(|e| anyhow::anyhow!("invalid LOG_LEVEL: {e}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to init logging: {e}"))?;
    Ok(guard)
}

/// Execute one subcommand to completion.
async fn run(cfg: &Config, command: Command) -> Result<()> {
    match command {
        Command::Rerating { window_minutes } => {
            let tasks = rerating::run(cfg, TimeDelta::minutes(window_minutes.into())).await?;
            // The batch is complete before the first message goes out.
            let http = Client::new();
            for task in &tasks {
                notify::send_message(&http, cfg, &notify::format_task(task)).await?;
            }
            tracing::info!("{} tasks reported", tasks.len());
        }
        Command::Rate {
            rate_start_date,
            rate_end_date,
            codes,
        } => {
            let (default_start, default_end) =
                reconcile::default_window(Local::now().date_naive());
            let report = reconcile::run(
                cfg,
                rate_start_date.unwrap_or(default_start),
                rate_end_date.unwrap_or(default_end),
                &codes,
            )
            .await?;
            println!("{}", report.mini_report);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let cfg = Config::init_from_env()?;
    let _log_guard = init_logging(&cfg)?;
    tracing::info!("start work");
    let res = run(&cfg, cli.command).await;
    if let Err(ref e) = res {
        tracing::error!("run failed: {e:#}");
    }
    tracing::info!("finished work");
    res
}
