mod clock;
mod config;
mod db;
mod errors;
mod extraction;
mod intake;
mod models;
mod notify;
mod routes;
mod scoring;
mod state;
mod storage;
#[cfg(test)]
mod testing;
mod validation;
mod verification;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use aws_config::timeout::TimeoutConfig;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::create_pool;
use crate::extraction::document::DocumentTextExtractor;
use crate::extraction::vocabulary::Vocabulary;
use crate::intake::IntakePipeline;
use crate::notify::smtp::SmtpMailer;
use crate::notify::Notifier;
use crate::routes::build_router;
use crate::scoring::RubricScorer;
use crate::state::AppState;
use crate::storage::blob::S3BlobStore;
use crate::storage::postgres::{purge_expired_codes, PgApplicationStore, PgCodeStore};
use crate::verification::rate_limit::RedisRateLimiter;
use crate::verification::CodeVerifier;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CODE_PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Careers API v{}", env!("CARGO_PKG_VERSION"));
    let policy = config.policy.clone();

    // PostgreSQL (migrations run on connect)
    let db = create_pool(&config.database_url, policy.dependency_timeout).await?;

    // Redis, used only for code-request counting
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // SMTP: one transport for the whole process, checked before serving
    let mailer = SmtpMailer::from_config(&config).context("invalid SMTP configuration")?;
    mailer
        .health_check()
        .await
        .context("SMTP health check failed")?;
    let notifier: Arc<dyn Notifier> = Arc::new(mailer);

    let vocabulary = Arc::new(Vocabulary::default());
    info!(
        "Vocabulary loaded: {} skills, {} degrees",
        vocabulary.skills.len(),
        vocabulary.degrees.len()
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    spawn_code_purge(db.clone(), clock.clone());

    let state = AppState {
        pipeline: IntakePipeline {
            applications: Arc::new(PgApplicationStore::new(db.clone())),
            blobs: Arc::new(S3BlobStore::new(s3, config.s3_bucket.clone())),
            notifier: notifier.clone(),
            extractor: Arc::new(DocumentTextExtractor),
            scorer: Arc::new(RubricScorer::new(vocabulary.clone())),
            vocabulary,
            policy: policy.clone(),
            hr_email: config.hr_email.clone(),
        },
        verifier: CodeVerifier::new(
            Arc::new(PgCodeStore::new(db)),
            notifier,
            Arc::new(RedisRateLimiter::new(redis, policy.dependency_timeout)),
            clock,
            policy,
        ),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "careers-static",
    );

    let timeouts = TimeoutConfig::builder()
        .operation_timeout(config.policy.dependency_timeout)
        .build();

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .timeout_config(timeouts)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

/// Expired codes are also removed on lookup; this only keeps the table small.
fn spawn_code_purge(pool: PgPool, clock: Arc<dyn Clock>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CODE_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            match purge_expired_codes(&pool, clock.now()).await {
                Ok(0) => {}
                Ok(n) => info!("Purged {n} expired verification codes"),
                Err(e) => warn!("Expired code purge failed: {e}"),
            }
        }
    });
}
