//! Request validation. Every problem is collected and reported per field.

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Policy;
use crate::errors::{AppError, FieldError};
use crate::extraction::document::DocumentKind;
use crate::intake::{SubmissionForm, SubmissionRequest, UploadedDocument};
use crate::models::application::CandidateProfile;
use crate::scoring::category::normalize_category;

static EMAIL_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("email shape pattern"));

/// Identity key form of an email: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates and normalises an email; used wherever an email is the identity.
pub fn validated_email(raw: Option<&str>) -> Result<String, FieldError> {
    let email = normalize_email(raw.unwrap_or_default());
    if email.is_empty() {
        return Err(FieldError::new("email", "Email is required"));
    }
    if !EMAIL_SHAPE_RE.is_match(&email) {
        return Err(FieldError::new("email", "Invalid email format"));
    }
    Ok(email)
}

/// Codes are exactly six ASCII digits.
pub fn validated_code(raw: Option<&str>) -> Result<String, FieldError> {
    let code = raw.unwrap_or_default().trim();
    if code.is_empty() {
        return Err(FieldError::new("code", "Code is required"));
    }
    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldError::new("code", "Code must be 6 digits"));
    }
    Ok(code.to_string())
}

/// Checks the multipart form and returns the typed request the pipeline consumes.
pub fn validate_submission(
    form: SubmissionForm,
    policy: &Policy,
) -> Result<SubmissionRequest, AppError> {
    let mut errors = Vec::new();

    let full_name = required(&mut errors, "fullName", &form.full_name, "Full name");
    check_length(&mut errors, "fullName", &full_name, 2, 100, "Full name");

    let email = match validated_email(form.email.as_deref()) {
        Ok(email) => email,
        Err(e) => {
            errors.push(e);
            String::new()
        }
    };

    let phone = required(&mut errors, "phone", &form.phone, "Phone");
    if !phone.is_empty() && !is_plausible_phone(&phone) {
        errors.push(FieldError::new("phone", "Invalid phone number"));
    }

    let city = required(&mut errors, "city", &form.city, "City");
    let state = required(&mut errors, "state", &form.state, "State");

    let college_name = required(&mut errors, "collegeName", &form.college_name, "College name");
    check_length(&mut errors, "collegeName", &college_name, 2, 200, "College name");

    let role_category = required(&mut errors, "roleCategory", &form.role_category, "Role category");
    let custom_role = optional(&form.custom_role);
    if normalize_category(&role_category).starts_with("custom") && custom_role.is_none() {
        errors.push(FieldError::new(
            "customRole",
            "Custom role is required when the category is Custom",
        ));
    }

    let linkedin = optional(&form.linkedin);
    if let Some(url) = &linkedin {
        if !(url.starts_with("https://") || url.starts_with("http://")) || !url.contains('.') {
            errors.push(FieldError::new("linkedin", "Invalid LinkedIn URL"));
        }
    }

    let description = optional(&form.description);
    if let Some(d) = &description {
        if d.chars().count() > 1000 {
            errors.push(FieldError::new(
                "description",
                "Description must not exceed 1000 characters",
            ));
        }
    }

    let document = match form.document {
        None => {
            errors.push(FieldError::new("resume", "Resume file is required"));
            None
        }
        Some(upload) => match DocumentKind::from_mime(&upload.content_type) {
            None => {
                errors.push(FieldError::new("resume", "Only PDF and DOCX files are allowed"));
                None
            }
            Some(_) if upload.bytes.is_empty() => {
                errors.push(FieldError::new("resume", "Resume file is empty"));
                None
            }
            Some(_) if upload.bytes.len() > policy.max_document_bytes => {
                errors.push(FieldError::new(
                    "resume",
                    format!(
                        "Resume must not exceed {} bytes",
                        policy.max_document_bytes
                    ),
                ));
                None
            }
            Some(kind) => Some(UploadedDocument {
                file_name: upload
                    .file_name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| "resume".to_string()),
                kind,
                bytes: upload.bytes,
            }),
        },
    };

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    let Some(document) = document else {
        return Err(AppError::field("resume", "Resume file is required"));
    };

    Ok(SubmissionRequest {
        profile: CandidateProfile {
            full_name,
            email,
            phone,
            city,
            state,
            linkedin,
            college_name,
            current_company: optional(&form.current_company),
            description,
            role_category,
            custom_role,
        },
        document,
    })
}

fn required(errors: &mut Vec<FieldError>, field: &str, value: &Option<String>, label: &str) -> String {
    let value = value.as_deref().unwrap_or_default().trim().to_string();
    if value.is_empty() {
        errors.push(FieldError::new(field, format!("{label} is required")));
    }
    value
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn check_length(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &str,
    min: usize,
    max: usize,
    label: &str,
) {
    let len = value.chars().count();
    if len > 0 && (len < min || len > max) {
        errors.push(FieldError::new(
            field,
            format!("{label} must be between {min} and {max} characters"),
        ));
    }
}

fn is_plausible_phone(phone: &str) -> bool {
    let stripped: String = phone
        .chars()
        .filter(|c| !matches!(c, '+' | '-' | '(' | ')' | ' '))
        .collect();
    (7..=15).contains(&stripped.len()) && stripped.chars().all(|c| c.is_ascii_digit())
}

/// Raw bytes of an upload before the allow-list check.
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}
