//! Notification service: request-path submission and status lookup.
//!
//! Submission only enqueues; delivery happens later in the notifier's worker.
//! A lookup can therefore miss a notification that is still queued, and that
//! miss is indistinguishable from an unknown or expired id.

use uuid::Uuid;

use hvitops_common::error::AppError;
use hvitops_common::keys::{NOTIFICATION_QUEUE, status_key};
use hvitops_common::store::QueueStore;
use hvitops_common::types::{DEFAULT_CHANNEL, Notification, NotificationRequest};

pub const MISSING_FIELDS: &str = "Missing required fields";
pub const NOT_FOUND: &str = "Notification not found";

/// Service layer for notification submission and status lookup.
pub struct NotificationService;

impl NotificationService {
    /// Validate a submission and build the pending notification for it.
    ///
    /// `recipient`, `subject` and `body` must be present and non-empty. An
    /// absent or empty `type` falls back to [`DEFAULT_CHANNEL`].
    pub fn prepare(request: NotificationRequest) -> Result<Notification, AppError> {
        let (Some(recipient), Some(subject), Some(body)) = (
            non_empty(request.recipient),
            non_empty(request.subject),
            non_empty(request.body),
        ) else {
            return Err(AppError::InvalidRequest(MISSING_FIELDS.to_string()));
        };

        let channel = non_empty(request.channel).unwrap_or_else(|| DEFAULT_CHANNEL.to_string());

        Ok(Notification::pending(recipient, subject, body, channel))
    }

    /// Validate and enqueue a notification, returning its id.
    ///
    /// Exactly one queue entry is written per successful call. The id only
    /// leaves this function once the push has succeeded.
    pub async fn submit(
        store: &dyn QueueStore,
        request: NotificationRequest,
    ) -> Result<Uuid, AppError> {
        let notification = Self::prepare(request)?;
        let entry = serde_json::to_string(&notification)?;

        store.push(NOTIFICATION_QUEUE, entry).await?;

        tracing::info!(
            notification_id = %notification.id,
            channel = %notification.channel,
            "Notification queued"
        );

        Ok(notification.id)
    }

    /// Look up the delivered record for `id`.
    pub async fn status(store: &dyn QueueStore, id: &str) -> Result<Notification, AppError> {
        let raw = store
            .get(&status_key(id))
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

        Ok(serde_json::from_str(&raw)?)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use hvitops_common::keys::STATUS_TTL;
    use hvitops_common::store::{MemoryQueueStore, StoreError};
    use hvitops_common::types::DeliveryStatus;

    use super::*;

    fn request(
        recipient: Option<&str>,
        subject: Option<&str>,
        body: Option<&str>,
    ) -> NotificationRequest {
        NotificationRequest {
            recipient: recipient.map(str::to_string),
            subject: subject.map(str::to_string),
            body: body.map(str::to_string),
            channel: None,
        }
    }

    fn valid() -> NotificationRequest {
        request(Some("a@x.com"), Some("Hi"), Some("Test"))
    }

    /// Store whose every operation fails, as if Redis were unreachable.
    struct DownStore;

    #[async_trait]
    impl QueueStore for DownStore {
        async fn push(&self, _: &str, _: String) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn pop(&self, _: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn len(&self, _: &str) -> Result<usize, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn set_with_expiry(&self, _: &str, _: String, _: Duration) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn get(&self, _: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn ttl(&self, _: &str) -> Result<Option<Duration>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_submit_enqueues_pending_notification() {
        let store = MemoryQueueStore::new();
        let id = NotificationService::submit(&store, valid()).await.unwrap();

        assert_eq!(store.len(NOTIFICATION_QUEUE).await.unwrap(), 1);
        let raw = store.pop(NOTIFICATION_QUEUE).await.unwrap().unwrap();
        let queued: Notification = serde_json::from_str(&raw).unwrap();
        assert_eq!(queued.id, id);
        assert_eq!(queued.recipient, "a@x.com");
        assert_eq!(queued.status, DeliveryStatus::Pending);
        assert_eq!(queued.channel, DEFAULT_CHANNEL);
        assert!(queued.sent_at.is_none());
    }

    #[tokio::test]
    async fn test_submit_keeps_explicit_channel() {
        let store = MemoryQueueStore::new();
        let mut req = valid();
        req.channel = Some("sms".to_string());
        NotificationService::submit(&store, req).await.unwrap();

        let raw = store.pop(NOTIFICATION_QUEUE).await.unwrap().unwrap();
        let queued: Notification = serde_json::from_str(&raw).unwrap();
        assert_eq!(queued.channel, "sms");
    }

    #[test]
    fn test_empty_channel_falls_back_to_default() {
        let mut req = valid();
        req.channel = Some(String::new());
        let n = NotificationService::prepare(req).unwrap();
        assert_eq!(n.channel, DEFAULT_CHANNEL);
    }

    #[tokio::test]
    async fn test_missing_or_empty_fields_rejected_without_enqueue() {
        let store = MemoryQueueStore::new();
        let cases = [
            request(None, Some("Hi"), Some("Test")),
            request(Some("a@x.com"), None, Some("Test")),
            request(Some("a@x.com"), Some("Hi"), None),
            request(Some(""), Some("Hi"), Some("Test")),
            request(Some("a@x.com"), Some(""), Some("Test")),
            request(Some("a@x.com"), Some("Hi"), Some("")),
            NotificationRequest::default(),
        ];

        for req in cases {
            let err = NotificationService::submit(&store, req).await.unwrap_err();
            match err {
                AppError::InvalidRequest(msg) => assert_eq!(msg, MISSING_FIELDS),
                other => panic!("expected InvalidRequest, got {other:?}"),
            }
        }

        assert_eq!(store.len(NOTIFICATION_QUEUE).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_repeated_submissions_get_distinct_ids() {
        let store = MemoryQueueStore::new();
        let mut ids = HashSet::new();
        for _ in 0..50 {
            ids.insert(NotificationService::submit(&store, valid()).await.unwrap());
        }
        assert_eq!(ids.len(), 50);
        assert_eq!(store.len(NOTIFICATION_QUEUE).await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_submit_store_failure() {
        let err = NotificationService::submit(&DownStore, valid())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_invalid_request_checked_before_store() {
        let err = NotificationService::submit(&DownStore, request(None, None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_status_unknown_id() {
        let store = MemoryQueueStore::new();
        let err = NotificationService::status(&store, &Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_status_of_queued_notification_is_not_found() {
        let store = MemoryQueueStore::new();
        let id = NotificationService::submit(&store, valid()).await.unwrap();

        let err = NotificationService::status(&store, &id.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_status_returns_sent_record() {
        let store = MemoryQueueStore::new();
        let mut n = NotificationService::prepare(valid()).unwrap();
        n.mark_sent(Utc::now());
        store
            .set_with_expiry(
                &status_key(n.id),
                serde_json::to_string(&n).unwrap(),
                STATUS_TTL,
            )
            .await
            .unwrap();

        let found = NotificationService::status(&store, &n.id.to_string())
            .await
            .unwrap();
        assert_eq!(found, n);
        assert_eq!(found.status, DeliveryStatus::Sent);
    }

    #[tokio::test]
    async fn test_status_store_failure() {
        let err = NotificationService::status(&DownStore, "anything")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }
}
