// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod upstream;
pub mod watchlist;

// ---- Re-exports for stable public API ----
pub use crate::cache::{slot_key, ttl_seconds, DedupCache};
pub use crate::error::{CacheError, NotifierError, PollError, UpstreamError};
pub use crate::notify::{compose_message, MessageId, Notifier};
pub use crate::pipeline::{PassOutcome, PassSummary, PollPipeline};
pub use crate::upstream::{LocationSummary, Slot, UpstreamClient};
pub use crate::watchlist::{LocationId, WatchList, WatchedLocation};

use std::sync::Arc;

use crate::cache::{memory::MemoryCache, redis_store::RedisCache};
use crate::config::{AppConfig, Delivery};
use crate::notify::{dry_run::LogNotifier, twilio::TwilioNotifier};
use crate::upstream::ttp::TtpClient;

/// Wire the production adapters described by `cfg` into a pipeline.
pub async fn build_pipeline(cfg: &AppConfig, watchlist: WatchList) -> anyhow::Result<PollPipeline> {
    use anyhow::Context;

    let upstream = TtpClient::new(cfg.upstream.clone()).context("building scheduler client")?;

    let (cache, notifier): (Arc<dyn DedupCache>, Arc<dyn Notifier>) = match &cfg.delivery {
        Delivery::Live {
            redis_url, twilio, ..
        } => {
            let cache = RedisCache::connect(redis_url, cfg.cache_timeout)
                .await
                .context("connecting to dedup store")?;
            let notifier = TwilioNotifier::new(twilio.clone())
                .with_timeout(cfg.upstream.connect_timeout + cfg.upstream.read_timeout);
            let cache: Arc<dyn DedupCache> = Arc::new(cache);
            let notifier: Arc<dyn Notifier> = Arc::new(notifier);
            (cache, notifier)
        }
        Delivery::DryRun { .. } => {
            tracing::warn!("dry run: in-memory dedup store, messages are only logged");
            let cache: Arc<dyn DedupCache> = Arc::new(MemoryCache::new());
            let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier::new());
            (cache, notifier)
        }
    };

    Ok(PollPipeline::new(
        Arc::new(watchlist),
        Arc::new(upstream),
        cache,
        notifier,
        cfg.delivery.recipient(),
    )
    .with_options(cfg.pipeline))
}
