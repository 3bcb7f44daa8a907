use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Fixed public-facing message for every invalid-link outcome. Not-found,
/// expired, and revoked are never distinguished to the caller.
pub const INVALID_LINK_MESSAGE: &str = "Link Expired or Revoked";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("link expired or revoked")]
    InvalidToken,

    #[error("authentication required")]
    Unauthorized,

    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            // One indistinguishable outcome for never-existed, expired, and
            // revoked tokens. No payload fields, no reason detail.
            AppError::InvalidToken => (
                StatusCode::NOT_FOUND,
                "invalid_link",
                "link_expired_or_revoked",
                INVALID_LINK_MESSAGE.to_string(),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "session_required",
                "invalid or missing session".to_string(),
            ),
            // Management callers are already authenticated, so a specific
            // message is not an enumeration risk.
            AppError::PermissionDenied { reason } => (
                StatusCode::FORBIDDEN,
                "permission_error",
                "permission_denied",
                reason.clone(),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "validation_failed",
                format!("{}: {}", field, message),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}
