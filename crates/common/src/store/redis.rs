use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::{QueueStore, StoreError};

/// Redis-backed store.
///
/// Producers `LPUSH` and the consumer `RPOP`s, so the list drains FIFO.
/// Status records use `SET key value EX ttl`.
#[derive(Clone)]
pub struct RedisQueueStore {
    conn: ConnectionManager,
}

impl RedisQueueStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl QueueStore for RedisQueueStore {
    async fn push(&self, queue: &str, entry: String) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(queue, entry).await?;
        Ok(())
    }

    async fn pop(&self, queue: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let entry: Option<String> = conn.rpop(queue, None).await?;
        Ok(entry)
    }

    async fn len(&self, queue: &str) -> Result<usize, StoreError> {
        let mut conn = self.conn.clone();
        let len: usize = conn.llen(queue).await?;
        Ok(len)
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        // EX has whole-second granularity and rejects 0
        let seconds = ttl.as_secs().max(1);
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, seconds).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let mut conn = self.conn.clone();
        // -2: key missing, -1: no expiry
        let seconds: i64 = conn.ttl(key).await?;
        Ok(u64::try_from(seconds)
            .ok()
            .map(Duration::from_secs))
    }
}
