mod config;
mod db;
mod errors;
mod generation;
mod jobs;
mod llm_client;
mod models;
mod notify;
mod resume;
mod routes;
mod session;
mod state;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::generation::assistant::AiContentAssistant;
use crate::jobs::identity::PgIdentityProvider;
use crate::jobs::lifecycle::JobLifecycleManager;
use crate::jobs::store::PgJobStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::SessionRegistry;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting job board API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (job records + identities)
    let db = create_pool(&config.database_url, config.database_max_connections).await?;
    let store = Arc::new(PgJobStore::new(db.clone()));
    let identity = Arc::new(PgIdentityProvider::new(db));

    // Initialize generation engine
    let llm = LlmClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;
    info!("LLM client initialized (model: {})", llm.model());

    let state = AppState {
        lifecycle: JobLifecycleManager::new(store, identity),
        assistant: AiContentAssistant::new(Arc::new(llm)),
        sessions: SessionRegistry::with_idle_ttl(Duration::from_secs(config.session_idle_secs)),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
