// src/cache/redis_store.rs
use async_trait::async_trait;
use redis::aio::{ConnectionLike, MultiplexedConnection};
use redis::AsyncCommands;
use std::future::Future;
use std::time::Duration;

use super::DedupCache;
use crate::error::CacheError;

/// Dedup records kept in Redis as plain `SETEX` keys.
#[derive(Clone)]
pub struct RedisCache<C = MultiplexedConnection> {
    conn: C,
    op_timeout: Duration,
}

impl RedisCache<MultiplexedConnection> {
    pub async fn connect(url: &str, op_timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(|e| CacheError::Connect(e.to_string()))?;
        let conn = tokio::time::timeout(op_timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| CacheError::Timeout)?
            .map_err(|e| CacheError::Connect(e.to_string()))?;
        tracing::debug!("redis dedup store connected");
        Ok(Self::with_connection(conn, op_timeout))
    }
}

impl<C> RedisCache<C>
where
    C: ConnectionLike + Clone + Send + Sync,
{
    pub fn with_connection(conn: C, op_timeout: Duration) -> Self {
        Self { conn, op_timeout }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<redis::RedisResult<T>, CacheError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| CacheError::Timeout)
    }
}

#[async_trait]
impl<C> DedupCache for RedisCache<C>
where
    C: ConnectionLike + Clone + Send + Sync,
{
    // Presence only; the payload is never read back.
    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.exists::<_, bool>(key))
            .await?
            .map_err(|e| CacheError::Read(e.to_string()))
    }

    async fn record(&self, key: &str, ttl_secs: i64, payload: &str) -> Result<(), CacheError> {
        if ttl_secs <= 0 {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        self.bounded(conn.set_ex::<_, _, ()>(key, payload, ttl_secs as u64))
            .await?
            .map_err(|e| CacheError::Write(e.to_string()))
    }
}
