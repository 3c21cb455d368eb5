// src/notify/dry_run.rs
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{MessageId, Notifier};
use crate::error::NotifierError;

/// Dry-run notifier: logs instead of texting.
#[derive(Debug, Default)]
pub struct LogNotifier {
    seq: AtomicU64,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: &str, body: &str) -> Result<MessageId, NotifierError> {
        let n = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(target: "notify", to = recipient, body, "dry-run: message not sent");
        Ok(MessageId(format!("dry-run-{n}")))
    }
}
