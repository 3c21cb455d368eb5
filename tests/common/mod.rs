// tests/common/mod.rs
// Hand-written fakes for the three adapter seams plus a fixed clock.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use nexus_slot_watch::error::{CacheError, NotifierError, UpstreamError};
use nexus_slot_watch::pipeline::Clock;
use nexus_slot_watch::upstream::{RawSlot, SlotZone};
use nexus_slot_watch::{
    DedupCache, LocationId, LocationSummary, MessageId, Notifier, Slot, UpstreamClient,
    WatchList, WatchedLocation,
};

pub fn champlain_watchlist() -> WatchList {
    WatchList::new(vec![WatchedLocation {
        id: 5021,
        label: "Champlain, NY".into(),
    }])
}

pub fn slot(location_id: LocationId, start: &str) -> Slot {
    Slot::from_raw(
        RawSlot {
            location_id,
            start_timestamp: start.to_string(),
            end_timestamp: None,
            duration: Some(15),
        },
        SlotZone::Fixed(FixedOffset::west_opt(4 * 3600).unwrap()),
    )
    .unwrap()
}

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ---------------- upstream ----------------

pub enum Slots {
    Ok(Vec<Slot>),
    Fail,
}

#[derive(Default)]
pub struct FakeUpstream {
    pub locations: Vec<LocationId>,
    pub discovery_fails: bool,
    pub slots: HashMap<LocationId, Slots>,
    pub slot_calls: Mutex<Vec<LocationId>>,
}

impl FakeUpstream {
    pub fn with_locations(ids: &[LocationId]) -> Self {
        Self {
            locations: ids.to_vec(),
            ..Self::default()
        }
    }

    pub fn slots_for(mut self, id: LocationId, slots: Vec<Slot>) -> Self {
        self.slots.insert(id, Slots::Ok(slots));
        self
    }

    pub fn failing_for(mut self, id: LocationId) -> Self {
        self.slots.insert(id, Slots::Fail);
        self
    }

    pub fn calls(&self) -> Vec<LocationId> {
        self.slot_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamClient for FakeUpstream {
    async fn list_open_locations(&self) -> Result<Vec<LocationSummary>, UpstreamError> {
        if self.discovery_fails {
            return Err(UpstreamError::Status(503));
        }
        Ok(self
            .locations
            .iter()
            .map(|id| LocationSummary {
                id: *id,
                name: None,
            })
            .collect())
    }

    async fn list_soonest_slots(
        &self,
        location_id: LocationId,
    ) -> Result<Vec<Slot>, UpstreamError> {
        self.slot_calls.lock().unwrap().push(location_id);
        match self.slots.get(&location_id) {
            Some(Slots::Ok(v)) => Ok(v.clone()),
            Some(Slots::Fail) => Err(UpstreamError::Timeout),
            None => Ok(Vec::new()),
        }
    }
}

// ---------------- cache ----------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCall {
    pub key: String,
    pub ttl: i64,
    pub payload: String,
}

#[derive(Default)]
pub struct FakeCache {
    pub live: Mutex<HashSet<String>>,
    pub records: Mutex<Vec<RecordCall>>,
    pub has_calls: Mutex<Vec<String>>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl FakeCache {
    pub fn seeded(keys: &[String]) -> Self {
        let c = Self::default();
        c.live.lock().unwrap().extend(keys.iter().cloned());
        c
    }

    pub fn records(&self) -> Vec<RecordCall> {
        self.records.lock().unwrap().clone()
    }

    pub fn live_len(&self) -> usize {
        self.live.lock().unwrap().len()
    }
}

#[async_trait]
impl DedupCache for FakeCache {
    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        self.has_calls.lock().unwrap().push(key.to_string());
        if self.fail_reads {
            return Err(CacheError::Read("connection refused".into()));
        }
        Ok(self.live.lock().unwrap().contains(key))
    }

    async fn record(&self, key: &str, ttl_secs: i64, payload: &str) -> Result<(), CacheError> {
        self.records.lock().unwrap().push(RecordCall {
            key: key.to_string(),
            ttl: ttl_secs,
            payload: payload.to_string(),
        });
        if self.fail_writes {
            return Err(CacheError::Write("READONLY".into()));
        }
        if ttl_secs > 0 {
            self.live.lock().unwrap().insert(key.to_string());
        }
        Ok(())
    }
}

// ---------------- notifier ----------------

#[derive(Default)]
pub struct FakeNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
    /// Bodies containing this text are rejected.
    pub reject_containing: Option<String>,
}

impl FakeNotifier {
    pub fn rejecting(text: &str) -> Self {
        Self {
            reject_containing: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, recipient: &str, body: &str) -> Result<MessageId, NotifierError> {
        if let Some(bad) = &self.reject_containing {
            if body.contains(bad.as_str()) {
                return Err(NotifierError::Status {
                    status: 401,
                    body: "Authenticate".into(),
                });
            }
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((recipient.to_string(), body.to_string()));
        Ok(MessageId(format!("SM{:04}", sent.len())))
    }
}
