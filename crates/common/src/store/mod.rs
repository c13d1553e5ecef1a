//! Durable queue store abstraction.
//!
//! The service relies on exactly two kinds of atomic primitives: push/pop on
//! a named list, and set-with-expiry/get on a key. Both the HTTP handlers and
//! the delivery worker receive the same `Arc<dyn QueueStore>` at startup.

mod memory;
mod redis;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use self::memory::MemoryQueueStore;
pub use self::redis::RedisQueueStore;

/// Failure talking to the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("{0}")]
    Unavailable(String),
}

/// List and key/value operations the notification service needs.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Append an entry to the tail of `queue`.
    async fn push(&self, queue: &str, entry: String) -> Result<(), StoreError>;

    /// Remove and return the entry at the head of `queue` without blocking.
    async fn pop(&self, queue: &str) -> Result<Option<String>, StoreError>;

    /// Number of entries currently in `queue`.
    async fn len(&self, queue: &str) -> Result<usize, StoreError>;

    /// Set `key` to `value`, expiring it after `ttl`.
    async fn set_with_expiry(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Value of `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Remaining lifetime of `key`; `None` when absent or without expiry.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError>;
}
