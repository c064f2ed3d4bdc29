//! Axum route handlers for the Applications API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::intake::{LimitStatus, SubmissionForm, SubmissionOutcome};
use crate::models::application::Decision;
use crate::state::AppState;
use crate::validation::{validate_submission, validated_email, RawUpload};

#[derive(Debug, Deserialize)]
pub struct LimitCheckRequest {
    pub email: Option<String>,
}

/// POST /api/v1/applications
///
/// Multipart form: candidate text fields plus the `resume` file part.
pub async fn handle_submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SubmissionOutcome>, AppError> {
    let form = read_form(multipart).await?;
    let request = validate_submission(form, &state.pipeline.policy)?;

    let outcome = state.pipeline.process(request).await?;
    if outcome.decision == Decision::Blocked {
        return Err(AppError::LimitExceeded(outcome.message));
    }
    Ok(Json(outcome))
}

/// POST /api/v1/applications/limit
pub async fn handle_check_limit(
    State(state): State<AppState>,
    Json(request): Json<LimitCheckRequest>,
) -> Result<Json<LimitStatus>, AppError> {
    let email = validated_email(request.email.as_deref())
        .map_err(|e| AppError::Validation(vec![e]))?;
    Ok(Json(state.pipeline.check_limit(&email).await?))
}

async fn read_form(mut multipart: Multipart) -> Result<SubmissionForm, AppError> {
    let mut form = SubmissionForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::field("form", format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "resume" {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::field("resume", format!("Could not read upload: {e}")))?;
            form.document = Some(RawUpload {
                file_name,
                content_type,
                bytes,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::field(&name, format!("Could not read field: {e}")))?;
        let slot = match name.as_str() {
            "fullName" => &mut form.full_name,
            "email" => &mut form.email,
            "phone" => &mut form.phone,
            "city" => &mut form.city,
            "state" => &mut form.state,
            "linkedin" => &mut form.linkedin,
            "collegeName" => &mut form.college_name,
            "currentCompany" => &mut form.current_company,
            "description" => &mut form.description,
            "roleCategory" => &mut form.role_category,
            "customRole" => &mut form.custom_role,
            _ => continue,
        };
        *slot = Some(value);
    }

    Ok(form)
}
