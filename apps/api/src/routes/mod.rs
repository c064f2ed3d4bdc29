pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::intake::handlers as intake;
use crate::state::AppState;
use crate::verification::handlers as verification;

/// Slack above the document ceiling for the text fields and multipart framing.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.pipeline.policy.max_document_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Applications API
        .route(
            "/api/v1/applications",
            post(intake::handle_submit).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/v1/applications/limit", post(intake::handle_check_limit))
        // Verification API
        .route(
            "/api/v1/verification/send",
            post(verification::handle_send_code),
        )
        .route(
            "/api/v1/verification/verify",
            post(verification::handle_verify_code),
        )
        .with_state(state)
}
