//! HTTP handlers: webhook ingestion and backend-initiated notifications.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use tokio::sync::mpsc;
use tracing::debug;

use super::types::{
    BulkNotifyRequest, BulkNotifyResponse, ErrorResponse, NotifyRequest, NotifyResponse,
};
use crate::app::Notifier;
use crate::backend::BackendError;
use crate::error::HandlerError;
use crate::event::Event;
use crate::session::UserId;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Inbound side of the dispatcher's update channel.
    pub updates: mpsc::Sender<Event>,
    pub notifier: Arc<Notifier>,
    /// Bearer token for the notify endpoints. Empty disables the guard.
    pub auth_token: String,
}

impl AppState {
    pub fn new(updates: mpsc::Sender<Event>, notifier: Arc<Notifier>, auth_token: String) -> Self {
        Self {
            updates,
            notifier,
            auth_token,
        }
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        if self.auth_token.is_empty() {
            return Ok(());
        }
        let presented = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if presented == Some(self.auth_token.as_str()) {
            Ok(())
        } else {
            Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::unauthorized()),
            ))
        }
    }
}

fn notify_error(user_id: UserId, err: HandlerError) -> ApiError {
    match err {
        HandlerError::Backend(BackendError::UserNotFound) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::user_not_found(user_id)),
        ),
        HandlerError::Send(message) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::unavailable(message)),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal_error(other.to_string())),
        ),
    }
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// Receive a platform update and feed it to the dispatcher.
///
/// Always unauthenticated: the platform does not send our bearer token.
/// Returns 200 as soon as the update is queued; processing is async.
pub async fn webhook(
    State(state): State<AppState>,
    Json(update): Json<serde_json::Value>,
) -> Result<StatusCode, ApiError> {
    let event = Event::from_update(&update);
    debug!(kind = event.kind(), "webhook update received");

    state.updates.send(event).await.map_err(|_| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::unavailable("bot is shutting down")),
        )
    })?;
    Ok(StatusCode::OK)
}

/// Send a free-form notification to one user.
pub async fn notify_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    headers: HeaderMap,
    Json(req): Json<NotifyRequest>,
) -> Result<Json<NotifyResponse>, ApiError> {
    state.authorize(&headers)?;
    if req.text.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("text must not be empty")),
        ));
    }

    let message_id = state
        .notifier
        .notify_user(user_id, req.text)
        .await
        .map_err(|e| notify_error(user_id, e))?;
    Ok(Json(NotifyResponse { message_id }))
}

/// Send the same notification to many users.
pub async fn notify_bulk(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<BulkNotifyRequest>,
) -> Result<Json<BulkNotifyResponse>, ApiError> {
    state.authorize(&headers)?;
    if req.text.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("text must not be empty")),
        ));
    }

    let delivered = state.notifier.notify_bulk(&req.user_ids, &req.text).await;
    Ok(Json(BulkNotifyResponse {
        requested: req.user_ids.len(),
        delivered,
    }))
}

/// Tell a user their document is ready.
pub async fn notify_ready(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    headers: HeaderMap,
) -> Result<Json<NotifyResponse>, ApiError> {
    state.authorize(&headers)?;

    let message_id = state
        .notifier
        .notify_document_ready(user_id)
        .await
        .map_err(|e| notify_error(user_id, e))?;
    Ok(Json(NotifyResponse { message_id }))
}

/// Remind a user about an unpaid tuition bill.
pub async fn notify_tuition(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    headers: HeaderMap,
) -> Result<Json<NotifyResponse>, ApiError> {
    state.authorize(&headers)?;

    let message_id = state
        .notifier
        .notify_tuition_reminder(user_id)
        .await
        .map_err(|e| notify_error(user_id, e))?;
    Ok(Json(NotifyResponse { message_id }))
}
