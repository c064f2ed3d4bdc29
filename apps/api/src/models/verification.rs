use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// The single live one-time code for an identity. Only the hash is ever stored.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CodeRecord {
    pub email: String,
    pub code_hash: String,
    pub failed_attempts: i32,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub locked_at: Option<DateTime<Utc>>,
}
