mod auth;
mod concurrency;
mod config;
mod db;
mod errors;
mod generation;
mod llm_client;
mod models;
mod render;
mod resume;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::auth::SupabaseAuth;
use crate::config::Config;
use crate::db::create_pool;
use crate::generation::generator::{ContentGenerator, GenerationMode};
use crate::llm_client::{CompletionBackend, LlmClient};
use crate::resume::store::PgResumeStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
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

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgResumeStore::new(db));

    // Initialize auth provider
    let auth = Arc::new(SupabaseAuth::new(
        &config.supabase_url,
        config.supabase_anon_key.clone(),
    )?);
    info!("Auth provider initialized ({})", config.supabase_url);

    // Initialize LLM client when a key is configured
    let backend: Option<Arc<dyn CompletionBackend>> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone())?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(llm))
        }
        None => None,
    };
    if config.generation_mode == GenerationMode::Live && backend.is_none() {
        warn!("ANTHROPIC_API_KEY is not set; live generation requests will fail");
    }
    info!("Generation mode: {:?}", config.generation_mode);

    let generator = ContentGenerator::new(config.generation_mode, backend);

    // Build app state
    let state = AppState::new(store, auth, generator);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
