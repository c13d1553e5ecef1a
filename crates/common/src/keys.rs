//! Store key layout shared by the API and the delivery worker.

use std::fmt::Display;
use std::time::Duration;

/// List holding serialized pending notifications.
pub const NOTIFICATION_QUEUE: &str = "notification_queue";

/// Prefix of the per-notification status keys.
pub const STATUS_KEY_PREFIX: &str = "notification";

/// Lifetime of a delivered notification's status record (24 hours).
pub const STATUS_TTL: Duration = Duration::from_secs(86_400);

/// Status key for a notification id: `notification:<id>`.
pub fn status_key(id: impl Display) -> String {
    format!("{}:{}", STATUS_KEY_PREFIX, id)
}
