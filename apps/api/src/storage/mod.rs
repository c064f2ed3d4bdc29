//! Persistence and blob collaborators.
//!
//! Each seam is a trait so the decision engine and the verification state machine can be
//! exercised against in-memory doubles. Operations are deliberately narrow and named
//! (increment, lock, delete) rather than generic field updates.

pub mod blob;
pub mod postgres;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::NewApplication;
use crate::models::verification::CodeRecord;

/// Sole writer: the decision engine.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Prior submissions for a normalised email.
    async fn count_for_email(&self, email: &str) -> Result<i64, AppError>;

    async fn insert(&self, application: &NewApplication) -> Result<(), AppError>;

    async fn mark_notified(&self, id: Uuid) -> Result<(), AppError>;

    async fn record_notification_error(&self, id: Uuid, error: &str) -> Result<(), AppError>;
}

/// At most one record per email.
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Removes any existing record for the email and stores `record` in its place.
    async fn replace(&self, record: &CodeRecord) -> Result<(), AppError>;

    async fn find(&self, email: &str) -> Result<Option<CodeRecord>, AppError>;

    async fn record_failure(&self, email: &str, failed_attempts: i32) -> Result<(), AppError>;

    async fn lock(
        &self,
        email: &str,
        failed_attempts: i32,
        locked_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    async fn delete(&self, email: &str) -> Result<(), AppError>;
}

/// Opaque-id binary store for retained documents.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the id to record.
    async fn store(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String, AppError>;

    /// Bytes previously stored under `id`.
    async fn retrieve(&self, id: &str) -> Result<Bytes, AppError>;

    async fn delete(&self, id: &str) -> Result<(), AppError>;
}
