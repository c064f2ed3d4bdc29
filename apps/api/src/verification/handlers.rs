//! Axum route handlers for email verification.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, FieldError};
use crate::state::AppState;
use crate::validation::{normalize_email, validated_code, validated_email};
use crate::verification::VerifyOutcome;

#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeResponse {
    pub sent: bool,
    pub message: String,
    pub expires_in_minutes: i64,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyCodeResponse {
    pub verified: bool,
    pub message: String,
}

/// POST /api/v1/verification/send
///
/// Never returns the code itself.
pub async fn handle_send_code(
    State(state): State<AppState>,
    Json(request): Json<SendCodeRequest>,
) -> Result<Json<SendCodeResponse>, AppError> {
    let email = validated_email(request.email.as_deref())
        .map_err(|e| AppError::Validation(vec![e]))?;

    let issued = state.verifier.issue(&email).await?;

    Ok(Json(SendCodeResponse {
        sent: true,
        message: "Verification code sent to your email".to_string(),
        expires_in_minutes: issued.expires_in_minutes,
    }))
}

/// POST /api/v1/verification/verify
///
/// Any failure is reported as the same `AuthenticationFailed` response.
pub async fn handle_verify_code(
    State(state): State<AppState>,
    Json(request): Json<VerifyCodeRequest>,
) -> Result<Json<VerifyCodeResponse>, AppError> {
    let mut errors = Vec::new();
    let email = request.email.as_deref().map(normalize_email).unwrap_or_default();
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    }
    let code = match validated_code(request.code.as_deref()) {
        Ok(code) => code,
        Err(e) => {
            errors.push(e);
            String::new()
        }
    };
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    match state.verifier.verify(&email, &code).await? {
        VerifyOutcome::Verified => Ok(Json(VerifyCodeResponse {
            verified: true,
            message: "Email verified successfully".to_string(),
        })),
        VerifyOutcome::Rejected(_) => Err(AppError::AuthenticationFailed),
    }
}
