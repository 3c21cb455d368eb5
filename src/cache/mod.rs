// src/cache/mod.rs
//! Dedup store: "have we already texted about this slot?"
//!
//! A record lives exactly as long as the appointment is still in the future,
//! so the store forgets a slot on its own once it can no longer be booked.

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::error::CacheError;
use crate::watchlist::LocationId;

const KEY_PREFIX: &str = "nexus-slot";

/// Dedup key for a slot: `nexus-slot:<id, 10 digits>:<start, unix seconds>`.
///
/// The id is zero-padded to the full width of `u32` and both components are
/// rendered from digits (plus a leading `-` for pre-1970 instants), so `:`
/// can only ever appear as the separator. Two timestamps that denote the same
/// instant in different offsets share one key.
pub fn slot_key<Tz: TimeZone>(location_id: LocationId, start: &DateTime<Tz>) -> String {
    format!("{KEY_PREFIX}:{location_id:010}:{}", start.timestamp())
}

/// Whole seconds from `now` until `start`; zero or negative once the
/// appointment time has been reached.
pub fn ttl_seconds<Tz: TimeZone>(start: &DateTime<Tz>, now: DateTime<Utc>) -> i64 {
    start.timestamp() - now.timestamp()
}

#[async_trait]
pub trait DedupCache: Send + Sync {
    /// True iff a live record exists for `key`.
    async fn has(&self, key: &str) -> Result<bool, CacheError>;

    /// Writes a record that expires after `ttl_secs`. A non-positive TTL
    /// cannot be represented and is accepted as a no-op.
    async fn record(&self, key: &str, ttl_secs: i64, payload: &str) -> Result<(), CacheError>;
}
