use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::NewApplication;
use crate::models::verification::CodeRecord;
use crate::storage::{ApplicationStore, CodeStore};

/// `applications` table.
#[derive(Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn count_for_email(&self, email: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert(&self, application: &NewApplication) -> Result<(), AppError> {
        let NewApplication {
            id,
            reference,
            profile,
            fields,
            score,
            scoring_status,
            decision,
            document_name,
            document_blob_id,
        } = application;
        let skills: Vec<String> = fields.skills.iter().cloned().collect();

        sqlx::query(
            r#"
            INSERT INTO applications
                (id, reference, full_name, email, phone, city, state, linkedin,
                 college_name, current_company, description, role_category, custom_role,
                 extracted_email, extracted_phone, skills, experience, education,
                 score, scoring_status, decision, document_name, document_blob_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)
            "#,
        )
        .bind(id)
        .bind(reference)
        .bind(&profile.full_name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.city)
        .bind(&profile.state)
        .bind(&profile.linkedin)
        .bind(&profile.college_name)
        .bind(&profile.current_company)
        .bind(&profile.description)
        .bind(&profile.role_category)
        .bind(&profile.custom_role)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(&skills)
        .bind(&fields.experience)
        .bind(&fields.education)
        .bind(score.map(|s| s as i32))
        .bind(scoring_status.as_str())
        .bind(decision.as_str())
        .bind(document_name)
        .bind(document_blob_id)
        .execute(&self.pool)
        .await?;

        info!("Inserted application {reference} ({})", decision.as_str());
        Ok(())
    }

    async fn mark_notified(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE applications SET notification_sent = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_notification_error(&self, id: Uuid, error: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE applications SET notification_error = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// `verification_codes` table, keyed by email.
#[derive(Clone)]
pub struct PgCodeStore {
    pool: PgPool,
}

impl PgCodeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CodeStore for PgCodeStore {
    async fn replace(&self, record: &CodeRecord) -> Result<(), AppError> {
        // Single statement: the previous record for this email is gone once this commits.
        sqlx::query(
            r#"
            INSERT INTO verification_codes
                (email, code_hash, failed_attempts, locked, created_at, expires_at, locked_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (email) DO UPDATE SET
                code_hash = EXCLUDED.code_hash,
                failed_attempts = EXCLUDED.failed_attempts,
                locked = EXCLUDED.locked,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at,
                locked_at = EXCLUDED.locked_at
            "#,
        )
        .bind(&record.email)
        .bind(&record.code_hash)
        .bind(record.failed_attempts)
        .bind(record.locked)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.locked_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, email: &str) -> Result<Option<CodeRecord>, AppError> {
        Ok(sqlx::query_as::<_, CodeRecord>(
            r#"
            SELECT email, code_hash, failed_attempts, locked, created_at, expires_at, locked_at
            FROM verification_codes
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn record_failure(&self, email: &str, failed_attempts: i32) -> Result<(), AppError> {
        sqlx::query("UPDATE verification_codes SET failed_attempts = $2 WHERE email = $1")
            .bind(email)
            .bind(failed_attempts)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn lock(
        &self,
        email: &str,
        failed_attempts: i32,
        locked_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE verification_codes
            SET failed_attempts = $2, locked = TRUE, locked_at = $3
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(failed_attempts)
        .bind(locked_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, email: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM verification_codes WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Removes records whose expiry has passed. An optimisation only; the verify path
/// deletes stale records on its own.
pub async fn purge_expired_codes(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM verification_codes WHERE expires_at < $1")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
