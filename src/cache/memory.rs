// src/cache/memory.rs
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::DedupCache;
use crate::error::CacheError;

#[derive(Debug)]
struct Entry {
    payload: String,
    expires_at: Instant,
}

/// In-process dedup store for dry runs. Only remembers slots for the lifetime
/// of the process, which for a single pass means "within this pass".
#[derive(Debug, Default)]
pub struct MemoryCache {
    inner: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload of a live record.
    pub fn payload(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let map = self.inner.lock().expect("memory cache mutex poisoned");
        map.get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.payload.clone())
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let map = self.inner.lock().expect("memory cache mutex poisoned");
        map.values().filter(|e| e.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DedupCache for MemoryCache {
    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        let now = Instant::now();
        let mut map = self.inner.lock().expect("memory cache mutex poisoned");
        match map.get(key) {
            Some(e) if e.expires_at > now => Ok(true),
            Some(_) => {
                map.remove(key);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn record(&self, key: &str, ttl_secs: i64, payload: &str) -> Result<(), CacheError> {
        if ttl_secs <= 0 {
            return Ok(());
        }
        let expires_at = Instant::now() + Duration::from_secs(ttl_secs as u64);
        let mut map = self.inner.lock().expect("memory cache mutex poisoned");
        map.insert(
            key.to_string(),
            Entry {
                payload: payload.to_string(),
                expires_at,
            },
        );
        Ok(())
    }
}
