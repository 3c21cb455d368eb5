// src/metrics.rs
use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::path::Path;

/// One-time metrics registration (so series carry help text when rendered).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "nexus_locations_discovered_total",
            "Locations reported with open slots by the scheduler."
        );
        describe_counter!(
            "nexus_locations_matched_total",
            "Discovered locations that are on the watch list."
        );
        describe_counter!(
            "nexus_location_errors_total",
            "Per-location slot fetches that failed."
        );
        describe_counter!(
            "nexus_notifications_sent_total",
            "Slot notifications handed to the SMS provider."
        );
        describe_counter!(
            "nexus_notifications_failed_total",
            "Slot notifications the SMS provider rejected."
        );
        describe_counter!(
            "nexus_slots_cached_total",
            "Slots skipped because they were already notified."
        );
        describe_counter!(
            "nexus_cache_errors_total",
            "Dedup store reads or writes that failed."
        );
        describe_gauge!("nexus_last_pass_ts", "Unix ts when the last pass finished.");
    });
}

/// Prometheus recorder for a single run. A one-shot process has no scrape
/// endpoint, so the rendered text goes to a node-exporter textfile instead.
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    pub fn install() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_described();
        Ok(Self { handle })
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Write via a sibling temp file + rename so the collector never reads a
    /// half-written file.
    pub fn write_textfile(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("prom.tmp");
        std::fs::write(&tmp, self.render())
            .with_context(|| format!("writing metrics to {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("renaming metrics file to {}", path.display()))?;
        Ok(())
    }
}
