mod chat;
mod config;
mod db;
mod documents;
mod errors;
mod llm_client;
mod models;
mod routes;
mod sanitize;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chat::history::HistoryRecorder;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{PgStore, Store};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting career API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let pool = create_pool(&config.database_url).await?;
    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));

    // Initialize model client
    let llm = LlmClient::new(
        config.model_api_url.clone(),
        config.model_api_key.clone(),
        config.model_timeout,
    )
    .context("failed to build model API client")?;
    info!("Model client initialized ({})", config.model_api_url);

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("could not create {}", config.upload_dir.display()))?;
    info!(
        "Uploads stored under {}, document processing: {:?}",
        config.upload_dir.display(),
        config.document_processing
    );

    // History entries are written by a detached worker
    let (history, _history_worker) = HistoryRecorder::spawn(store.clone());

    let state = AppState {
        store,
        llm,
        config: config.clone(),
        history,
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
