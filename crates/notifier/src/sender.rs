//! Delivery collaborators.
//!
//! The worker hands every dequeued notification to a [`Sender`]. The default
//! [`LogSender`] only records the delivery; [`WebhookSender`] forwards it to an
//! HTTP endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use hvitops_common::types::Notification;

/// Timeout for a single webhook delivery.
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook rejected notification with status {0}")]
    Rejected(StatusCode),
}

/// Performs the out-of-process side of a delivery.
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), DeliveryError>;
}

/// Sender that writes the delivery to the log and always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSender;

#[async_trait]
impl Sender for LogSender {
    async fn send(&self, notification: &Notification) -> Result<(), DeliveryError> {
        tracing::info!(
            notification_id = %notification.id,
            channel = %notification.channel,
            recipient = %notification.recipient,
            subject = %notification.subject,
            body = %notification.body,
            "Sending notification"
        );
        Ok(())
    }
}

/// Sender that POSTs the notification JSON to a webhook.
///
/// Any non-2xx response counts as a failed delivery.
#[derive(Debug, Clone)]
pub struct WebhookSender {
    client: reqwest::Client,
    url: String,
}

impl WebhookSender {
    pub fn new(url: impl Into<String>) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Sender for WebhookSender {
    async fn send(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected(status));
        }

        tracing::debug!(
            notification_id = %notification.id,
            url = %self.url,
            "Webhook accepted notification"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::State;
    use axum::routing::post;
    use axum::{Json, Router};
    use tokio::sync::mpsc;

    use hvitops_common::types::DEFAULT_CHANNEL;

    use super::*;

    fn sample() -> Notification {
        Notification::pending(
            "a@x.com".to_string(),
            "Hi".to_string(),
            "Test".to_string(),
            DEFAULT_CHANNEL.to_string(),
        )
    }

    async fn record(
        State(tx): State<mpsc::UnboundedSender<serde_json::Value>>,
        Json(body): Json<serde_json::Value>,
    ) -> axum::http::StatusCode {
        let _ = tx.send(body);
        axum::http::StatusCode::ACCEPTED
    }

    async fn refuse() -> axum::http::StatusCode {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    }

    /// Serve a local webhook and return its base URL plus received bodies.
    async fn spawn_webhook() -> (String, mpsc::UnboundedReceiver<serde_json::Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Router::new()
            .route("/hook", post(record))
            .route("/down", post(refuse))
            .with_state(tx);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), rx)
    }

    #[tokio::test]
    async fn test_log_sender_succeeds() {
        assert!(LogSender.send(&sample()).await.is_ok());
    }

    #[tokio::test]
    async fn test_webhook_posts_notification() {
        let (base, mut rx) = spawn_webhook().await;
        let sender = WebhookSender::new(format!("{}/hook", base)).unwrap();
        let n = sample();

        sender.send(&n).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received["id"], n.id.to_string());
        assert_eq!(received["recipient"], "a@x.com");
        assert_eq!(received["type"], "email");
    }

    #[tokio::test]
    async fn test_webhook_non_success_is_rejected() {
        let (base, _rx) = spawn_webhook().await;
        let sender = WebhookSender::new(format!("{}/down", base)).unwrap();

        let err = sender.send(&sample()).await.unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::Rejected(status) if status == StatusCode::SERVICE_UNAVAILABLE
        ));
    }
}
