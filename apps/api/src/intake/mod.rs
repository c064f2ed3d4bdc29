//! Decision engine for candidate submissions.
//!
//! `received -> {scored | score-skipped} -> {qualified | manual-review | rejected | blocked}`
//!
//! The submission ceiling is checked before anything else runs. Persistence happens for
//! every terminal decision except `blocked`; notification only for the positive ones.

pub mod handlers;

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Policy;
use crate::errors::AppError;
use crate::extraction::document::{extract_off_runtime, DocumentKind, TextExtractor};
use crate::extraction::fields::{extract_fields, ExtractedFields};
use crate::extraction::vocabulary::Vocabulary;
use crate::models::application::{
    application_reference, CandidateProfile, Decision, NewApplication, ScoringStatus,
};
use crate::notify::{templates, Attachment, Notifier, OutboundMessage};
use crate::scoring::category::is_bypass_category;
use crate::scoring::ResumeScorer;
use crate::storage::blob::document_key;
use crate::storage::{ApplicationStore, BlobStore};
use crate::validation::RawUpload;

// ────────────────────────────────────────────────────────────────────────────
// Request / outcome types
// ────────────────────────────────────────────────────────────────────────────

/// Multipart fields as received, before validation.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub linkedin: Option<String>,
    pub college_name: Option<String>,
    pub current_company: Option<String>,
    pub description: Option<String>,
    pub role_category: Option<String>,
    pub custom_role: Option<String>,
    pub document: Option<RawUpload>,
}

/// An allow-listed, size-checked document.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub kind: DocumentKind,
    pub bytes: Bytes,
}

/// A validated submission.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub profile: CandidateProfile,
    pub document: UploadedDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub decision: Decision,
    pub score: Option<u32>,
    pub scoring_status: Option<ScoringStatus>,
    pub application_reference: Option<String>,
    pub message: String,
    pub notification_sent: bool,
}

impl SubmissionOutcome {
    fn blocked(prior_count: i64, ceiling: i64) -> Self {
        Self {
            decision: Decision::Blocked,
            score: None,
            scoring_status: None,
            application_reference: None,
            message: format!(
                "Maximum submission limit reached ({prior_count}/{ceiling}). No further applications can be accepted for this email."
            ),
            notification_sent: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitStatus {
    pub allowed: bool,
    pub prior_count: i64,
    pub ceiling: i64,
    pub remaining: i64,
}

pub fn decision_message(decision: Decision) -> &'static str {
    match decision {
        Decision::Qualified => "Congratulations! Your profile meets our requirements.",
        Decision::ManualReview => "Application received. Your profile will be reviewed manually.",
        Decision::Rejected => "Unfortunately, your profile does not meet our current requirements.",
        Decision::Blocked => "Maximum submission limit reached.",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Collaborators the decision engine drives. Constructed once in `main`.
#[derive(Clone)]
pub struct IntakePipeline {
    pub applications: Arc<dyn ApplicationStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub notifier: Arc<dyn Notifier>,
    pub extractor: Arc<dyn TextExtractor>,
    pub scorer: Arc<dyn ResumeScorer>,
    pub vocabulary: Arc<Vocabulary>,
    pub policy: Policy,
    pub hr_email: String,
}

impl IntakePipeline {
    pub async fn check_limit(&self, email: &str) -> Result<LimitStatus, AppError> {
        let prior_count = self.applications.count_for_email(email).await?;
        let ceiling = self.policy.submission_ceiling;
        Ok(LimitStatus {
            allowed: prior_count < ceiling,
            prior_count,
            ceiling,
            remaining: (ceiling - prior_count).max(0),
        })
    }

    /// Runs one submission to a terminal decision.
    ///
    /// `NotificationFailed` means the record was saved; any other error means it was not.
    pub async fn process(&self, request: SubmissionRequest) -> Result<SubmissionOutcome, AppError> {
        let SubmissionRequest { profile, document } = request;
        info!(
            email = %profile.email,
            category = %profile.role_category,
            file = %document.file_name,
            "application received"
        );

        let limit = self.check_limit(&profile.email).await?;
        if !limit.allowed {
            warn!(
                email = %profile.email,
                prior = limit.prior_count,
                ceiling = limit.ceiling,
                "submission blocked by limit"
            );
            return Ok(SubmissionOutcome::blocked(limit.prior_count, limit.ceiling));
        }

        let (fields, raw_text) = self.extract(&document).await;
        let (score, scoring_status, decision) = self.decide(&profile, &fields, &raw_text);
        info!(
            email = %profile.email,
            decision = decision.as_str(),
            score = ?score,
            "decision reached"
        );

        let id = Uuid::new_v4();
        let reference = application_reference(id);

        let document_blob_id = if decision.notifies() {
            let key = document_key(id, &document.file_name);
            Some(
                self.blobs
                    .store(&key, document.bytes.clone(), document.kind.mime())
                    .await?,
            )
        } else {
            None
        };

        let application = NewApplication {
            id,
            reference: reference.clone(),
            profile,
            fields,
            score,
            scoring_status,
            decision,
            document_name: document.file_name.clone(),
            document_blob_id,
        };

        if let Err(e) = self.applications.insert(&application).await {
            if let Some(blob_id) = &application.document_blob_id {
                if let Err(cleanup) = self.blobs.delete(blob_id).await {
                    error!(blob_id = %blob_id, "failed to remove orphaned document: {cleanup}");
                }
            }
            return Err(e);
        }
        info!(reference = %reference, "application saved");

        let notification_sent = if decision.notifies() {
            self.notify_recruiters(&application, &document).await?
        } else {
            false
        };

        Ok(SubmissionOutcome {
            decision,
            score,
            scoring_status: Some(scoring_status),
            application_reference: Some(reference),
            message: decision_message(decision).to_string(),
            notification_sent,
        })
    }

    /// Extraction failure degrades to empty fields and empty text.
    async fn extract(&self, document: &UploadedDocument) -> (ExtractedFields, String) {
        match extract_off_runtime(
            self.extractor.clone(),
            document.bytes.clone(),
            document.kind,
        )
        .await
        {
            Ok(text) => (extract_fields(&text, &self.vocabulary), text),
            Err(e) => {
                warn!(file = %document.file_name, "text extraction failed, continuing with empty fields: {e}");
                (ExtractedFields::default(), String::new())
            }
        }
    }

    fn decide(
        &self,
        profile: &CandidateProfile,
        fields: &ExtractedFields,
        raw_text: &str,
    ) -> (Option<u32>, ScoringStatus, Decision) {
        if is_bypass_category(&profile.role_category) {
            info!(category = %profile.role_category, "scoring skipped for category");
            return (
                Some(self.policy.bypass_score),
                ScoringStatus::Skipped,
                Decision::ManualReview,
            );
        }

        let breakdown = self.scorer.score(fields, raw_text, &profile.role_category);
        info!(
            category = %profile.role_category,
            score = breakdown.total,
            status = ScoringStatus::Completed.as_str(),
            "score calculated"
        );
        let decision = if breakdown.total >= self.policy.qualifying_score {
            Decision::Qualified
        } else {
            Decision::Rejected
        };
        (Some(breakdown.total), ScoringStatus::Completed, decision)
    }

    async fn notify_recruiters(
        &self,
        application: &NewApplication,
        document: &UploadedDocument,
    ) -> Result<bool, AppError> {
        let message = OutboundMessage {
            to: self.hr_email.clone(),
            subject: templates::hr_notification_subject(application),
            html_body: templates::hr_notification_body(application),
            attachment: Some(Attachment {
                file_name: document.file_name.clone(),
                content_type: document.kind.mime().to_string(),
                bytes: document.bytes.clone(),
            }),
        };

        match self.notifier.send(message).await {
            Ok(()) => {
                info!(reference = %application.reference, "recruitment team notified");
                match self.applications.mark_notified(application.id).await {
                    Ok(()) => Ok(true),
                    Err(e) => {
                        let reason =
                            format!("delivered, but the notification flag was not saved: {e}");
                        error!(reference = %application.reference, "{reason}");
                        self.record_notification_error(application, &reason).await;
                        Ok(false)
                    }
                }
            }
            Err(e) => {
                let reason = e.to_string();
                error!(reference = %application.reference, "notification failed: {reason}");
                self.record_notification_error(application, &reason).await;
                Err(AppError::NotificationFailed {
                    reference: application.reference.clone(),
                    reason,
                })
            }
        }
    }

    async fn record_notification_error(&self, application: &NewApplication, reason: &str) {
        if let Err(e) = self
            .applications
            .record_notification_error(application.id, reason)
            .await
        {
            error!(reference = %application.reference, "failed to record notification error: {e}");
        }
    }
}
