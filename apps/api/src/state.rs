use std::sync::Arc;

use sqlx::PgPool;

use crate::analysis::pipeline::SessionRegistry;
use crate::config::Config;
use crate::llm_client::AnalysisBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Pluggable analysis backend. Production wires `GeminiClient`; tests
    /// substitute mocks.
    pub analyzer: Arc<dyn AnalysisBackend>,
    pub config: Config,
    /// Per-session analysis pipelines, created lazily on first upload.
    pub sessions: SessionRegistry,
}
