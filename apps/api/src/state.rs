use crate::intake::IntakePipeline;
use crate::verification::CodeVerifier;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every external collaborator lives behind a trait object inside these two engines.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: IntakePipeline,
    pub verifier: CodeVerifier,
}
