//! In-memory collaborators for exercising the pipeline and the verifier without
//! Postgres, S3, Redis or SMTP.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::clock::Clock;
use crate::errors::AppError;
use crate::extraction::document::{DocumentKind, ExtractionError, TextExtractor};
use crate::models::application::NewApplication;
use crate::models::verification::CodeRecord;
use crate::notify::{Notifier, NotifyError, OutboundMessage};
use crate::storage::{ApplicationStore, BlobStore, CodeStore};
use crate::verification::rate_limit::RateLimiter;

#[derive(Default)]
pub struct MemoryApplicationStore {
    pub rows: Mutex<Vec<NewApplication>>,
    pub notified: Mutex<Vec<Uuid>>,
    pub notification_errors: Mutex<HashMap<Uuid, String>>,
    prior: Mutex<HashMap<String, i64>>,
    pub fail_insert: AtomicBool,
    pub fail_mark_notified: AtomicBool,
    pub count_calls: AtomicUsize,
}

impl MemoryApplicationStore {
    /// Pretends `count` submissions already exist for `email`.
    pub fn with_prior(email: &str, count: i64) -> Self {
        let store = Self::default();
        store
            .prior
            .lock()
            .unwrap()
            .insert(email.to_string(), count);
        store
    }

    pub fn rows(&self) -> Vec<NewApplication> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn count_for_email(&self, email: &str) -> Result<i64, AppError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        let seeded = self.prior.lock().unwrap().get(email).copied().unwrap_or(0);
        let stored = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.profile.email == email)
            .count() as i64;
        Ok(seeded + stored)
    }

    async fn insert(&self, application: &NewApplication) -> Result<(), AppError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(AppError::Persistence(sqlx::Error::PoolTimedOut));
        }
        self.rows.lock().unwrap().push(application.clone());
        Ok(())
    }

    async fn mark_notified(&self, id: Uuid) -> Result<(), AppError> {
        if self.fail_mark_notified.load(Ordering::SeqCst) {
            return Err(AppError::Persistence(sqlx::Error::PoolTimedOut));
        }
        self.notified.lock().unwrap().push(id);
        Ok(())
    }

    async fn record_notification_error(&self, id: Uuid, error: &str) -> Result<(), AppError> {
        self.notification_errors
            .lock()
            .unwrap()
            .insert(id, error.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCodeStore {
    pub records: Mutex<HashMap<String, CodeRecord>>,
}

impl MemoryCodeStore {
    pub fn get(&self, email: &str) -> Option<CodeRecord> {
        self.records.lock().unwrap().get(email).cloned()
    }
}

#[async_trait]
impl CodeStore for MemoryCodeStore {
    async fn replace(&self, record: &CodeRecord) -> Result<(), AppError> {
        self.records
            .lock()
            .unwrap()
            .insert(record.email.clone(), record.clone());
        Ok(())
    }

    async fn find(&self, email: &str) -> Result<Option<CodeRecord>, AppError> {
        Ok(self.get(email))
    }

    async fn record_failure(&self, email: &str, failed_attempts: i32) -> Result<(), AppError> {
        if let Some(r) = self.records.lock().unwrap().get_mut(email) {
            r.failed_attempts = failed_attempts;
        }
        Ok(())
    }

    async fn lock(
        &self,
        email: &str,
        failed_attempts: i32,
        locked_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if let Some(r) = self.records.lock().unwrap().get_mut(email) {
            r.failed_attempts = failed_attempts;
            r.locked = true;
            r.locked_at = Some(locked_at);
        }
        Ok(())
    }

    async fn delete(&self, email: &str) -> Result<(), AppError> {
        self.records.lock().unwrap().remove(email);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBlobStore {
    pub blobs: Mutex<HashMap<String, Bytes>>,
    pub fail_store: AtomicBool,
}

impl MemoryBlobStore {
    pub fn keys(&self) -> Vec<String> {
        self.blobs.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, key: &str, bytes: Bytes, _content_type: &str) -> Result<String, AppError> {
        if self.fail_store.load(Ordering::SeqCst) {
            return Err(AppError::Storage("bucket unavailable".to_string()));
        }
        self.blobs.lock().unwrap().insert(key.to_string(), bytes);
        Ok(key.to_string())
    }

    async fn retrieve(&self, id: &str) -> Result<Bytes, AppError> {
        self.blobs
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::Storage(format!("no document stored under {id}")))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.blobs.lock().unwrap().remove(id);
        Ok(())
    }
}

/// Counts hits per key; the window is ignored.
#[derive(Default)]
pub struct MemoryRateLimiter {
    hits: Mutex<HashMap<String, u64>>,
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn allow(&self, key: &str, limit: u64, _window: Duration) -> Result<bool, AppError> {
        let mut hits = self.hits.lock().unwrap();
        let count = hits.entry(key.to_string()).or_insert(0);
        *count += 1;
        Ok(*count <= limit)
    }
}

/// Keeps every message it was asked to send; fails on demand.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<OutboundMessage>>,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.fail.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: OutboundMessage) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Transport("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Returns canned text (or a parse failure) and counts invocations.
pub struct CountingExtractor {
    text: Option<String>,
    pub calls: AtomicUsize,
}

impl CountingExtractor {
    pub fn returning(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextExtractor for CountingExtractor {
    fn extract(&self, _bytes: &[u8], _kind: DocumentKind) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text
            .clone()
            .ok_or_else(|| ExtractionError::Pdf("corrupt xref table".to_string()))
    }
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
