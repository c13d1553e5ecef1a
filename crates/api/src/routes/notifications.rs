//! Notification submission and status routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use hvitops_common::error::AppError;
use hvitops_common::types::{Notification, NotificationRequest, SubmissionAck};
use hvitops_engine::notification::NotificationService;

use crate::state::AppState;

pub const QUEUED_MESSAGE: &str = "Notification queued successfully";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications", post(create_notification))
        .route("/notifications/{id}", get(get_notification))
}

/// POST /notifications — Queue a notification for delivery.
///
/// Responds as soon as the entry is queued; delivery happens in the worker.
async fn create_notification(
    State(state): State<AppState>,
    payload: Result<Json<NotificationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmissionAck>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let id = NotificationService::submit(state.store.as_ref(), request).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmissionAck {
            message: QUEUED_MESSAGE.to_string(),
            notification_id: id,
        }),
    ))
}

/// GET /notifications/:id — Fetch a delivered notification.
///
/// Queued, unknown and expired ids all answer 404.
async fn get_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Notification>, AppError> {
    let notification = NotificationService::status(state.store.as_ref(), &id).await?;
    Ok(Json(notification))
}
