mod auth;
mod config;
mod errors;
mod export;
mod generation;
mod history;
mod llm_client;
mod local_store;
mod models;
mod profile;
mod record_store;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::local_store::LocalStore;
use crate::record_store::{EndpointResolver, HttpRecordStore};
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

    info!("Starting ResuMate API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the local store (file, Redis, or memory)
    let local = LocalStore::open(&config.local_store).await?;

    // Initialize the remote record store
    let endpoint = EndpointResolver::new(local.clone(), config.store_endpoint_url.clone());
    match endpoint.resolve().await? {
        Some(resolved) => info!("Remote store: {} ({:?})", resolved.url, resolved.source),
        None => warn!("No remote store configured; records stay in the local fallback store"),
    }
    let remote = Arc::new(HttpRecordStore::new(endpoint.clone())?);

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone(), &config.gemini_api_base)?;
    info!("LLM client initialized ({})", config.gemini_api_base);

    // Build app state
    let state = AppState::new(config.clone(), local, endpoint, remote, llm);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
