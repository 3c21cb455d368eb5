//! nexus-slot-watch — Binary Entrypoint
//! Runs exactly one poll pass and exits. Repetition belongs to cron or a
//! systemd timer.
//!
//! Exit status: 0 on a completed pass (including "no candidates"), 1 when
//! setup fails or the scheduler cannot be asked for locations at all.

use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nexus_slot_watch::config::{watchlist::load_watchlist_default, AppConfig};
use nexus_slot_watch::metrics::Metrics;
use nexus_slot_watch::{build_pipeline, PassOutcome};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nexus_slot_watch=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

async fn run() -> Result<()> {
    let cfg = AppConfig::from_env().context("loading configuration")?;
    let watchlist = load_watchlist_default().context("loading watch list")?;
    tracing::info!(locations = ?watchlist.ids(), "watch list loaded");

    let metrics = match &cfg.metrics_textfile {
        Some(_) => Some(Metrics::install()?),
        None => None,
    };

    let pipeline = build_pipeline(&cfg, watchlist).await?;
    let outcome = pipeline.run_pass().await;

    if let (Some(m), Some(path)) = (&metrics, &cfg.metrics_textfile) {
        if let Err(e) = m.write_textfile(path) {
            tracing::warn!(error = ?e, "metrics textfile not written");
        }
    }

    match outcome? {
        PassOutcome::NoCandidates { discovered } => {
            tracing::info!(discovered, "done - nothing to report");
        }
        PassOutcome::Completed(summary) => {
            tracing::info!(
                notified = summary.notified.len(),
                problems = summary.problem_count(),
                "done"
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when the variables come from the unit file.
    let _ = dotenvy::dotenv();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "pass failed");
            ExitCode::FAILURE
        }
    }
}
