use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Message returned for every failed code verification, whatever the cause.
pub const GENERIC_VERIFICATION_FAILURE: &str = "Invalid or expired code";

/// A single user-correctable problem with a request field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0:?}")]
    Validation(Vec<FieldError>),

    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Application {reference} saved but notification failed: {reason}")]
    NotificationFailed { reference: String, reason: String },

    #[error("Code delivery failed: {0}")]
    CodeDelivery(String),

    #[error("Rate limiter error: {0}")]
    RateLimiter(#[from] redis::RedisError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for a validation failure on a single field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": {
                        "code": "VALIDATION_ERROR",
                        "message": "One or more fields are invalid",
                        "fields": errors,
                    }
                }),
            ),
            AppError::LimitExceeded(msg) => (
                StatusCode::TOO_MANY_REQUESTS,
                error_body("LIMIT_EXCEEDED", msg),
            ),
            AppError::AuthenticationFailed => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "verified": false,
                    "error": {
                        "code": "AUTHENTICATION_FAILED",
                        "message": GENERIC_VERIFICATION_FAILURE,
                    }
                }),
            ),
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body(
                        "PERSISTENCE_FAILED",
                        "Failed to save application data. Please try again.",
                    ),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("STORAGE_ERROR", "A storage error occurred"),
                )
            }
            AppError::NotificationFailed { reference, reason } => {
                tracing::error!("Notification failed for application {reference}: {reason}");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({
                        "saved": true,
                        "applicationReference": reference,
                        "error": {
                            "code": "NOTIFICATION_FAILED",
                            "message": "Application saved, but the recruitment team could not be notified",
                        }
                    }),
                )
            }
            AppError::CodeDelivery(msg) => {
                tracing::error!("Code delivery failed: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    error_body("CODE_DELIVERY_FAILED", "Failed to send verification code"),
                )
            }
            AppError::RateLimiter(e) => {
                tracing::error!("Rate limiter error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("INTERNAL_ERROR", "An internal server error occurred"),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("INTERNAL_ERROR", "An internal server error occurred"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

fn error_body(code: &str, message: &str) -> serde_json::Value {
    json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}
