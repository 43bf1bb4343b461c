use std::sync::Arc;

use crate::evaluation::Evaluator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The evaluation pipeline. Holds only read-only data (taxonomy, clients),
    /// so concurrent requests share it without locking.
    pub evaluator: Arc<Evaluator>,
    pub max_upload_bytes: usize,
}
