use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extraction::fields::ExtractedFields;

/// Terminal outcome of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    Qualified,
    ManualReview,
    Rejected,
    /// Submission ceiling reached; nothing was extracted, stored or sent.
    Blocked,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Qualified => "qualified",
            Decision::ManualReview => "manual-review",
            Decision::Rejected => "rejected",
            Decision::Blocked => "blocked",
        }
    }

    /// Whether the recruitment team is told about this outcome.
    pub fn notifies(&self) -> bool {
        matches!(self, Decision::Qualified | Decision::ManualReview)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringStatus {
    Completed,
    Skipped,
}

impl ScoringStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringStatus::Completed => "completed",
            ScoringStatus::Skipped => "skipped",
        }
    }
}

/// Identity and declared fields supplied by the candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub full_name: String,
    /// Normalised (trimmed, lowercase); the identity key.
    pub email: String,
    pub phone: String,
    pub city: String,
    pub state: String,
    pub linkedin: Option<String>,
    pub college_name: String,
    pub current_company: Option<String>,
    pub description: Option<String>,
    pub role_category: String,
    pub custom_role: Option<String>,
}

/// A fully decided submission, ready for a single insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub id: Uuid,
    pub reference: String,
    pub profile: CandidateProfile,
    pub fields: ExtractedFields,
    pub score: Option<u32>,
    pub scoring_status: ScoringStatus,
    pub decision: Decision,
    pub document_name: String,
    pub document_blob_id: Option<String>,
}

/// Short, human-quotable reference: first 8 hex chars of the record id, uppercase.
pub fn application_reference(id: Uuid) -> String {
    id.simple().to_string()[..8].to_uppercase()
}
