use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::{QueueStore, StoreError};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Default)]
struct Inner {
    lists: HashMap<String, VecDeque<String>>,
    keys: HashMap<String, Entry>,
}

/// In-process store for local runs and tests.
///
/// Expiry is evaluated lazily on read against `tokio::time::Instant`, so a
/// paused test clock controls it.
#[derive(Default)]
pub struct MemoryQueueStore {
    inner: Mutex<Inner>,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    /// Drop `key` if its expiry has passed; returns the live entry otherwise.
    fn live_entry<'a>(inner: &'a mut Inner, key: &str, now: Instant) -> Option<&'a Entry> {
        if inner.keys.get(key).is_some_and(|e| e.is_expired(now)) {
            inner.keys.remove(key);
        }
        inner.keys.get(key)
    }
}

#[async_trait]
impl QueueStore for MemoryQueueStore {
    async fn push(&self, queue: &str, entry: String) -> Result<(), StoreError> {
        self.lock()?
            .lists
            .entry(queue.to_string())
            .or_default()
            .push_back(entry);
        Ok(())
    }

    async fn pop(&self, queue: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .lock()?
            .lists
            .get_mut(queue)
            .and_then(VecDeque::pop_front))
    }

    async fn len(&self, queue: &str) -> Result<usize, StoreError> {
        Ok(self.lock()?.lists.get(queue).map_or(0, VecDeque::len))
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let entry = Entry {
            value,
            expires_at: Some(Instant::now() + ttl),
        };
        self.lock()?.keys.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut inner = self.lock()?;
        Ok(Self::live_entry(&mut inner, key, Instant::now()).map(|e| e.value.clone()))
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let now = Instant::now();
        let mut inner = self.lock()?;
        Ok(Self::live_entry(&mut inner, key, now)
            .and_then(|e| e.expires_at)
            .map(|at| at.saturating_duration_since(now)))
    }
}
