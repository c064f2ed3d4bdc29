use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub mail_from: String,
    pub hr_email: String,
    pub port: u16,
    pub rust_log: String,
    pub policy: Policy,
}

/// Decision and verification constants. Pinned defaults; each can be overridden from env.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub qualifying_score: u32,
    pub submission_ceiling: i64,
    pub bypass_score: u32,
    pub code_ttl_minutes: i64,
    pub code_max_attempts: i32,
    pub code_request_limit: u64,
    pub code_request_window_secs: u64,
    pub max_document_bytes: usize,
    pub dependency_timeout: Duration,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            qualifying_score: 60,
            submission_ceiling: 6,
            bypass_score: 75,
            code_ttl_minutes: 10,
            code_max_attempts: 5,
            code_request_limit: 5,
            code_request_window_secs: 600,
            max_document_bytes: 5 * 1024 * 1024,
            dependency_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            smtp_host: require_env("SMTP_HOST")?,
            smtp_port: optional_env("SMTP_PORT", 587)?,
            smtp_username: require_env("SMTP_USERNAME")?,
            smtp_password: require_env("SMTP_PASSWORD")?,
            mail_from: require_env("MAIL_FROM")?,
            hr_email: require_env("HR_EMAIL")?,
            port: optional_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            policy: Policy::from_env()?,
        })
    }
}

impl Policy {
    fn from_env() -> Result<Self> {
        let defaults = Policy::default();
        Ok(Policy {
            qualifying_score: optional_env("QUALIFYING_SCORE", defaults.qualifying_score)?,
            submission_ceiling: optional_env("SUBMISSION_CEILING", defaults.submission_ceiling)?,
            bypass_score: optional_env("BYPASS_SCORE", defaults.bypass_score)?,
            code_ttl_minutes: optional_env("CODE_TTL_MINUTES", defaults.code_ttl_minutes)?,
            code_max_attempts: optional_env("CODE_MAX_ATTEMPTS", defaults.code_max_attempts)?,
            code_request_limit: optional_env("CODE_REQUEST_LIMIT", defaults.code_request_limit)?,
            code_request_window_secs: optional_env(
                "CODE_REQUEST_WINDOW_SECS",
                defaults.code_request_window_secs,
            )?,
            max_document_bytes: optional_env("MAX_DOCUMENT_BYTES", defaults.max_document_bytes)?,
            dependency_timeout: Duration::from_secs(optional_env(
                "DEPENDENCY_TIMEOUT_SECS",
                defaults.dependency_timeout.as_secs(),
            )?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}
