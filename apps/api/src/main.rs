mod analysis;
mod auth;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::pipeline::SessionRegistry;
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::llm_client::{default_safety_settings, AnalysisBackend, GeminiClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; everything downstream receives it explicitly.
    let config = Config::from_env()?;

    // Initialize structured logging
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

    info!("Starting Brainwave API v{}", env!("CARGO_PKG_VERSION"));

    if config.uses_insecure_secret() {
        warn!("JWT_SECRET is not set; tokens are signed with an insecure development default");
    }
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; resume analysis calls will fail");
    }

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;

    // Initialize the analysis backend
    let analyzer: Arc<dyn AnalysisBackend> = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        default_safety_settings(),
        Duration::from_secs(config.analyze_timeout_secs),
    ));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Build app state
    let state = AppState {
        db,
        analyzer,
        config: config.clone(),
        sessions: SessionRegistry::new(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
