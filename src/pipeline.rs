// src/pipeline.rs
//! # Poll pipeline
//! One pass: discover locations with open slots → keep the watched ones →
//! fetch the soonest slot per location → skip slots already in the dedup
//! store → text the operator → remember the slot until its start time.
//!
//! Failure domains: discovery failing ends the pass with an error; a failed
//! slot fetch only loses that location; a failed cache read, send or cache
//! write only loses that slot. Everything isolated is reported in
//! [`PassSummary`] rather than raised.

use chrono::{DateTime, FixedOffset, Utc};
use futures_util::stream::{self, StreamExt};
use metrics::{counter, gauge};
use std::sync::Arc;

use crate::cache::{slot_key, ttl_seconds, DedupCache};
use crate::error::{PollError, UpstreamError};
use crate::notify::{compose_message, MessageId, Notifier};
use crate::upstream::{Slot, UpstreamClient};
use crate::watchlist::{LocationId, WatchList};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Upper bound on concurrent per-location slot fetches.
    pub fetch_concurrency: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            fetch_concurrency: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifiedSlot {
    pub key: String,
    pub location_id: LocationId,
    pub start: DateTime<FixedOffset>,
    pub message_id: MessageId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationFailure {
    pub location_id: LocationId,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotFailure {
    pub key: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Watched locations the scheduler reported, in upstream order.
    pub matched: Vec<LocationId>,
    pub slots_seen: usize,
    pub notified: Vec<NotifiedSlot>,
    pub skipped_cached: usize,
    pub location_failures: Vec<LocationFailure>,
    /// Dedup lookups that failed; the slot was skipped for this pass.
    pub cache_read_failures: Vec<SlotFailure>,
    /// Sends that failed; no record written so the next pass retries.
    pub notify_failures: Vec<SlotFailure>,
    /// Sent, but the dedup record could not be stored.
    pub cache_write_warnings: Vec<SlotFailure>,
    /// Sent for a slot whose start time had already been reached, so there
    /// was no lifetime left to record.
    pub sent_unrecorded: usize,
}

impl PassSummary {
    /// Count of isolated problems (warnings included).
    pub fn problem_count(&self) -> usize {
        self.location_failures.len()
            + self.cache_read_failures.len()
            + self.notify_failures.len()
            + self.cache_write_warnings.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// None of the discovered locations is watched. The usual case.
    NoCandidates { discovered: usize },
    Completed(PassSummary),
}

pub struct PollPipeline {
    watchlist: Arc<WatchList>,
    upstream: Arc<dyn UpstreamClient>,
    cache: Arc<dyn DedupCache>,
    notifier: Arc<dyn Notifier>,
    recipient: String,
    options: PipelineOptions,
    clock: Arc<dyn Clock>,
}

impl PollPipeline {
    pub fn new(
        watchlist: Arc<WatchList>,
        upstream: Arc<dyn UpstreamClient>,
        cache: Arc<dyn DedupCache>,
        notifier: Arc<dyn Notifier>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            watchlist,
            upstream,
            cache,
            notifier,
            recipient: recipient.into(),
            options: PipelineOptions::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run one complete pass.
    pub async fn run_pass(&self) -> Result<PassOutcome, PollError> {
        crate::metrics::ensure_described();

        let discovered = match self.upstream.list_open_locations().await {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "location discovery failed");
                return Err(PollError::Discovery(e));
            }
        };
        counter!("nexus_locations_discovered_total").increment(discovered.len() as u64);

        let mut matched: Vec<LocationId> = Vec::new();
        for loc in &discovered {
            if self.watchlist.is_watched(loc.id) && !matched.contains(&loc.id) {
                matched.push(loc.id);
            }
        }

        if matched.is_empty() {
            tracing::info!(
                discovered = discovered.len(),
                watched = ?self.watchlist.ids(),
                "no appointments at watched locations"
            );
            gauge!("nexus_last_pass_ts").set(self.clock.now().timestamp() as f64);
            return Ok(PassOutcome::NoCandidates {
                discovered: discovered.len(),
            });
        }
        counter!("nexus_locations_matched_total").increment(matched.len() as u64);

        let fetched = self.fetch_slots(&matched).await;

        let mut summary = PassSummary {
            matched,
            ..PassSummary::default()
        };

        for (location_id, result) in fetched {
            match result {
                Ok(slots) => {
                    for slot in &slots {
                        self.process_slot(location_id, slot, &mut summary).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(location_id, error = %e, "slot fetch failed");
                    counter!("nexus_location_errors_total").increment(1);
                    summary.location_failures.push(LocationFailure {
                        location_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        gauge!("nexus_last_pass_ts").set(self.clock.now().timestamp() as f64);
        tracing::info!(
            matched = summary.matched.len(),
            slots = summary.slots_seen,
            notified = summary.notified.len(),
            cached = summary.skipped_cached,
            problems = summary.problem_count(),
            "pass complete"
        );
        Ok(PassOutcome::Completed(summary))
    }

    /// Fetches run concurrently up to the worker limit; results come back in
    /// the order of `ids`.
    async fn fetch_slots(
        &self,
        ids: &[LocationId],
    ) -> Vec<(LocationId, Result<Vec<Slot>, UpstreamError>)> {
        let upstream = &self.upstream;
        stream::iter(ids.iter().copied())
            .map(|id| async move { (id, upstream.list_soonest_slots(id).await) })
            .buffered(self.options.fetch_concurrency.max(1))
            .collect()
            .await
    }

    /// check → send → record. The record is written only after a successful
    /// send, so a crash in between can duplicate a text but never drop one.
    async fn process_slot(&self, queried: LocationId, slot: &Slot, summary: &mut PassSummary) {
        summary.slots_seen += 1;
        let key = slot_key(slot.location_id, &slot.start);

        match self.cache.has(&key).await {
            Ok(true) => {
                tracing::info!(
                    location_id = slot.location_id,
                    start = %slot.start_timestamp,
                    "cached appointment"
                );
                counter!("nexus_slots_cached_total").increment(1);
                summary.skipped_cached += 1;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                // Fail closed: the slot waits until the store answers again.
                tracing::warn!(%key, error = %e, "dedup lookup failed; skipping slot");
                counter!("nexus_cache_errors_total").increment(1);
                summary.cache_read_failures.push(SlotFailure {
                    key,
                    error: e.to_string(),
                });
                return;
            }
        }

        let label = self
            .watchlist
            .label_for(slot.location_id)
            .or_else(|| self.watchlist.label_for(queried))
            .unwrap_or("unknown location");
        let body = compose_message(label, &slot.start);

        tracing::info!(
            to = %self.recipient,
            location_id = slot.location_id,
            start = %slot.start_timestamp,
            "sending message"
        );
        let message_id = match self.notifier.send(&self.recipient, &body).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(%key, error = %e, "notification failed; slot will be retried");
                counter!("nexus_notifications_failed_total").increment(1);
                summary.notify_failures.push(SlotFailure {
                    key,
                    error: e.to_string(),
                });
                return;
            }
        };
        tracing::info!(message_id = %message_id, "sent message");
        counter!("nexus_notifications_sent_total").increment(1);

        let ttl = ttl_seconds(&slot.start, self.clock.now());
        let payload = serde_json::to_string(slot).unwrap_or_else(|_| slot.start_timestamp.clone());
        match self.cache.record(&key, ttl, &payload).await {
            Ok(()) if ttl <= 0 => {
                tracing::debug!(%key, ttl, "slot start already reached; nothing to remember");
                summary.sent_unrecorded += 1;
            }
            Ok(()) => {}
            Err(e) => {
                tracing::warn!(%key, error = %e, "dedup record not stored; slot may be sent again");
                counter!("nexus_cache_errors_total").increment(1);
                summary.cache_write_warnings.push(SlotFailure {
                    key: key.clone(),
                    error: e.to_string(),
                });
            }
        }

        summary.notified.push(NotifiedSlot {
            key,
            location_id: slot.location_id,
            start: slot.start,
            message_id,
        });
    }
}
