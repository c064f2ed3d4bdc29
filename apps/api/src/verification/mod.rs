//! One-time code verification.
//!
//! A record moves `issued -> {verified | expired | locked | failed}`. Every failed
//! lookup looks the same to the caller; the actual reason stays in the logs.

pub mod code;
pub mod handlers;
pub mod rate_limit;

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::Policy;
use crate::errors::AppError;
use crate::models::verification::CodeRecord;
use crate::notify::{templates, Notifier, OutboundMessage};
use crate::storage::CodeStore;
use crate::verification::code::{code_matches, generate_code, hash_code};
use crate::verification::rate_limit::{code_request_key, RateLimiter};

/// Why a verification attempt failed. Internal only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NoCode,
    Locked,
    Expired,
    WrongCode { attempts: i32 },
    LockedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    Rejected(RejectReason),
}

/// Returned after a code was stored and dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCode {
    pub expires_in_minutes: i64,
}

#[derive(Clone)]
pub struct CodeVerifier {
    codes: Arc<dyn CodeStore>,
    notifier: Arc<dyn Notifier>,
    limiter: Arc<dyn RateLimiter>,
    clock: Arc<dyn Clock>,
    policy: Policy,
}

impl CodeVerifier {
    pub fn new(
        codes: Arc<dyn CodeStore>,
        notifier: Arc<dyn Notifier>,
        limiter: Arc<dyn RateLimiter>,
        clock: Arc<dyn Clock>,
        policy: Policy,
    ) -> Self {
        Self {
            codes,
            notifier,
            limiter,
            clock,
            policy,
        }
    }

    /// Issues a fresh code for a normalised email, replacing any live one.
    pub async fn issue(&self, email: &str) -> Result<IssuedCode, AppError> {
        let allowed = self
            .limiter
            .allow(
                &code_request_key(email),
                self.policy.code_request_limit,
                Duration::from_secs(self.policy.code_request_window_secs),
            )
            .await?;
        if !allowed {
            warn!(email, "code request limit reached");
            return Err(AppError::LimitExceeded(
                "Too many verification code requests. Please try again later.".to_string(),
            ));
        }

        self.issue_specific(email, &generate_code()).await
    }

    pub(crate) async fn issue_specific(
        &self,
        email: &str,
        code: &str,
    ) -> Result<IssuedCode, AppError> {
        let now = self.clock.now();
        let ttl = self.policy.code_ttl_minutes;
        let record = CodeRecord {
            email: email.to_string(),
            code_hash: hash_code(code),
            failed_attempts: 0,
            locked: false,
            created_at: now,
            expires_at: now + ChronoDuration::minutes(ttl),
            locked_at: None,
        };
        self.codes.replace(&record).await?;

        let message = OutboundMessage {
            to: email.to_string(),
            subject: templates::code_subject().to_string(),
            html_body: templates::code_body(code, ttl),
            attachment: None,
        };
        if let Err(e) = self.notifier.send(message).await {
            // an undelivered code must not stay redeemable
            if let Err(cleanup) = self.codes.delete(email).await {
                tracing::error!(email, "failed to remove undelivered code record: {cleanup}");
            }
            return Err(AppError::CodeDelivery(e.to_string()));
        }

        info!(email, expires_at = %record.expires_at, "verification code issued");
        Ok(IssuedCode {
            expires_in_minutes: ttl,
        })
    }

    pub async fn verify(&self, email: &str, code: &str) -> Result<VerifyOutcome, AppError> {
        let Some(record) = self.codes.find(email).await? else {
            return Ok(self.reject(email, RejectReason::NoCode));
        };

        if record.locked {
            self.codes.delete(email).await?;
            return Ok(self.reject(email, RejectReason::Locked));
        }

        let now = self.clock.now();
        if now > record.expires_at {
            self.codes.delete(email).await?;
            return Ok(self.reject(email, RejectReason::Expired));
        }

        if code_matches(code, &record.code_hash) {
            self.codes.delete(email).await?;
            info!(email, "email verified");
            return Ok(VerifyOutcome::Verified);
        }

        let attempts = record.failed_attempts + 1;
        if attempts >= self.policy.code_max_attempts {
            self.codes.lock(email, attempts, now).await?;
            return Ok(self.reject(email, RejectReason::LockedOut));
        }
        self.codes.record_failure(email, attempts).await?;
        Ok(self.reject(email, RejectReason::WrongCode { attempts }))
    }

    fn reject(&self, email: &str, reason: RejectReason) -> VerifyOutcome {
        warn!(email, ?reason, "verification failed");
        VerifyOutcome::Rejected(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, MemoryCodeStore, MemoryRateLimiter, RecordingNotifier};

    struct Harness {
        verifier: CodeVerifier,
        codes: Arc<MemoryCodeStore>,
        notifier: Arc<RecordingNotifier>,
        clock: Arc<ManualClock>,
    }

    fn harness_with(notifier: RecordingNotifier) -> Harness {
        let codes = Arc::new(MemoryCodeStore::default());
        let notifier = Arc::new(notifier);
        let clock = Arc::new(ManualClock::new());
        let verifier = CodeVerifier::new(
            codes.clone(),
            notifier.clone(),
            Arc::new(MemoryRateLimiter::default()),
            clock.clone(),
            Policy::default(),
        );
        Harness {
            verifier,
            codes,
            notifier,
            clock,
        }
    }

    fn harness() -> Harness {
        harness_with(RecordingNotifier::default())
    }

    #[tokio::test]
    async fn test_issue_stores_hash_and_sends_code() {
        let h = harness();
        let issued = h.verifier.issue_specific("a@b.com", "123456").await.unwrap();
        assert_eq!(issued.expires_in_minutes, 10);

        let record = h.codes.get("a@b.com").unwrap();
        assert_ne!(record.code_hash, "123456");
        assert_eq!(record.failed_attempts, 0);
        assert!(!record.locked);
        assert_eq!(record.expires_at - record.created_at, ChronoDuration::minutes(10));

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@b.com");
        assert!(sent[0].html_body.contains("123456"));
    }

    #[tokio::test]
    async fn test_correct_code_verifies_once() {
        let h = harness();
        h.verifier.issue_specific("a@b.com", "123456").await.unwrap();

        let first = h.verifier.verify("a@b.com", "123456").await.unwrap();
        assert_eq!(first, VerifyOutcome::Verified);
        assert!(h.codes.get("a@b.com").is_none());

        let replay = h.verifier.verify("a@b.com", "123456").await.unwrap();
        assert_eq!(replay, VerifyOutcome::Rejected(RejectReason::NoCode));
    }

    #[tokio::test]
    async fn test_reissue_replaces_previous_code() {
        let h = harness();
        h.verifier.issue_specific("a@b.com", "111111").await.unwrap();
        h.verifier.issue_specific("a@b.com", "222222").await.unwrap();

        assert!(matches!(
            h.verifier.verify("a@b.com", "111111").await.unwrap(),
            VerifyOutcome::Rejected(_)
        ));
        assert_eq!(
            h.verifier.verify("a@b.com", "222222").await.unwrap(),
            VerifyOutcome::Verified
        );
    }

    #[tokio::test]
    async fn test_five_wrong_codes_lock_then_record_is_deleted() {
        let h = harness();
        h.verifier.issue_specific("a@b.com", "123456").await.unwrap();

        for attempt in 1..=4 {
            let outcome = h.verifier.verify("a@b.com", "000000").await.unwrap();
            assert_eq!(
                outcome,
                VerifyOutcome::Rejected(RejectReason::WrongCode { attempts: attempt })
            );
        }
        let fifth = h.verifier.verify("a@b.com", "000000").await.unwrap();
        assert_eq!(fifth, VerifyOutcome::Rejected(RejectReason::LockedOut));
        let record = h.codes.get("a@b.com").unwrap();
        assert!(record.locked);
        assert_eq!(record.failed_attempts, 5);
        assert!(record.locked_at.is_some());

        // even the right code is refused once locked, and the lookup removes the record
        let sixth = h.verifier.verify("a@b.com", "123456").await.unwrap();
        assert_eq!(sixth, VerifyOutcome::Rejected(RejectReason::Locked));
        assert!(h.codes.get("a@b.com").is_none());
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected_and_deleted() {
        let h = harness();
        h.verifier.issue_specific("a@b.com", "123456").await.unwrap();
        h.clock.advance(ChronoDuration::minutes(10) + ChronoDuration::seconds(1));

        let outcome = h.verifier.verify("a@b.com", "123456").await.unwrap();
        assert_eq!(outcome, VerifyOutcome::Rejected(RejectReason::Expired));
        assert!(h.codes.get("a@b.com").is_none());
    }

    #[tokio::test]
    async fn test_code_still_valid_at_expiry_instant() {
        let h = harness();
        h.verifier.issue_specific("a@b.com", "123456").await.unwrap();
        h.clock.advance(ChronoDuration::minutes(10));

        assert_eq!(
            h.verifier.verify("a@b.com", "123456").await.unwrap(),
            VerifyOutcome::Verified
        );
    }

    #[tokio::test]
    async fn test_failed_dispatch_leaves_no_record() {
        let h = harness_with(RecordingNotifier::failing());
        let err = h.verifier.issue_specific("a@b.com", "123456").await.unwrap_err();

        assert!(matches!(err, AppError::CodeDelivery(_)));
        assert!(h.codes.get("a@b.com").is_none());
    }

    #[tokio::test]
    async fn test_request_limit_stops_issuance() {
        let h = harness();
        for _ in 0..5 {
            h.verifier.issue("a@b.com").await.unwrap();
        }
        let err = h.verifier.issue("a@b.com").await.unwrap_err();

        assert!(matches!(err, AppError::LimitExceeded(_)));
        assert_eq!(h.notifier.sent().len(), 5);
    }
}
