//! Delivery worker: drains the notification queue.
//!
//! Each iteration pops at most one entry, delivers it through the configured
//! [`Sender`], and records the `sent` state under `notification:<id>` with a
//! 24 hour expiry. Delivery is at-most-once: an entry is gone from the queue
//! as soon as it is popped, so a failure later in the iteration loses it.
//! Failures are logged and never stop the loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use hvitops_common::keys::{NOTIFICATION_QUEUE, STATUS_TTL, status_key};
use hvitops_common::store::{QueueStore, StoreError};
use hvitops_common::types::Notification;

use crate::sender::{DeliveryError, Sender};

/// Failure inside a single worker iteration.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Delivery of {id} failed: {source}")]
    Delivery {
        id: Uuid,
        #[source]
        source: DeliveryError,
    },
}

pub struct DeliveryWorker {
    store: Arc<dyn QueueStore>,
    sender: Arc<dyn Sender>,
    poll_interval: Duration,
}

impl DeliveryWorker {
    pub fn new(
        store: Arc<dyn QueueStore>,
        sender: Arc<dyn Sender>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            sender,
            poll_interval,
        }
    }

    /// Run one iteration. Returns the delivered notification, or `None` when
    /// the queue was empty.
    pub async fn process_next(&self) -> Result<Option<Notification>, WorkerError> {
        let Some(entry) = self.store.pop(NOTIFICATION_QUEUE).await? else {
            return Ok(None);
        };

        let mut notification: Notification = serde_json::from_str(&entry)?;

        self.sender
            .send(&notification)
            .await
            .map_err(|source| WorkerError::Delivery {
                id: notification.id,
                source,
            })?;

        notification.mark_sent(Utc::now());
        let record = serde_json::to_string(&notification)?;
        self.store
            .set_with_expiry(&status_key(notification.id), record, STATUS_TTL)
            .await?;

        tracing::info!(
            notification_id = %notification.id,
            channel = %notification.channel,
            "Notification sent"
        );

        Ok(Some(notification))
    }

    /// Poll the queue until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// The worker sleeps `poll_interval` after every iteration, including
    /// failed ones. Shutdown interrupts the sleep but never an iteration in
    /// progress.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Delivery worker started"
        );

        while !*shutdown.borrow() {
            if let Err(e) = self.process_next().await {
                tracing::error!(error = %e, "Delivery worker iteration failed");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Delivery worker stopped");
    }
}
