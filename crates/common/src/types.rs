use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Channel used when a submission does not name one.
pub const DEFAULT_CHANNEL: &str = "email";

/// Notification delivery status.
///
/// There is no failed state: an entry that cannot be delivered is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Sent,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Pending => write!(f, "pending"),
            DeliveryStatus::Sent => write!(f, "sent"),
        }
    }
}

/// A notification, either waiting in the queue or recorded as delivered.
///
/// The same JSON shape is used for queue entries and status records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    /// Delivery channel tag, e.g. "email"
    #[serde(rename = "type")]
    pub channel: String,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Build a freshly submitted notification with a new id.
    pub fn pending(recipient: String, subject: String, body: String, channel: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient,
            subject,
            body,
            channel,
            status: DeliveryStatus::Pending,
            created_at: Utc::now(),
            sent_at: None,
        }
    }

    /// Transition to `sent`, stamping the delivery time.
    pub fn mark_sent(&mut self, at: DateTime<Utc>) {
        self.status = DeliveryStatus::Sent;
        self.sent_at = Some(at);
    }
}

/// Body of `POST /notifications`.
///
/// Every field is optional at the wire level so that missing fields surface
/// as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationRequest {
    pub recipient: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    #[serde(rename = "type")]
    pub channel: Option<String>,
}

/// Acknowledgment returned for an accepted submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAck {
    pub message: String,
    pub notification_id: Uuid,
}
