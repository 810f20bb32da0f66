//! Request and response types for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::session::UserId;

/// Body for `POST /notify/{user_id}` and the per-kind notify endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifyRequest {
    /// Message text. Ignored by the canned-text endpoints.
    #[serde(default)]
    pub text: String,
}

/// Body for `POST /notify/bulk`.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkNotifyRequest {
    pub user_ids: Vec<UserId>,
    pub text: String,
}

/// Response for single-recipient notify endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct NotifyResponse {
    pub message_id: String,
}

/// Response for `POST /notify/bulk`.
#[derive(Debug, Clone, Serialize)]
pub struct BulkNotifyResponse {
    pub requested: usize,
    pub delivered: usize,
}

/// Uniform error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn unauthorized() -> Self {
        Self {
            error: "unauthorized".to_string(),
            message: "missing or invalid bearer token".to_string(),
        }
    }

    pub fn user_not_found(user_id: UserId) -> Self {
        Self {
            error: "user_not_found".to_string(),
            message: format!("user {user_id} is not registered"),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: "bad_request".to_string(),
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            error: "internal_error".to_string(),
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            error: "unavailable".to_string(),
            message: message.into(),
        }
    }
}
