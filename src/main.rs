//! Ember Chat - multi-conversation chat service
//!
//! A Rust backend implementing the conversation store and completion
//! gateway behind a browser chat client.

mod api;
mod chat;
mod gateway;
mod store;

use api::{create_router, AppState};
use gateway::{CompletionGateway, GatewayConfig, LoggingGateway, OpenAIGateway};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use store::{SessionPersister, SessionStore, RECORD_FILE_NAME};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ember_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let data_path = std::env::var("EMBER_DATA_PATH").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.ember-chat/{RECORD_FILE_NAME}")
    });

    let port: u16 = std::env::var("EMBER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    // Ensure the data directory exists
    if let Some(parent) = PathBuf::from(&data_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Open the conversation store
    tracing::info!(path = %data_path, "Opening conversation record");
    let store = SessionStore::open(SessionPersister::new(&data_path)).await;

    // Completion gateway
    let config = GatewayConfig::from_env();
    if config.api_key.is_none() {
        tracing::warn!("No API key configured. Set OPENAI_API_KEY.");
    }
    let gateway = Arc::new(LoggingGateway::new(Arc::new(OpenAIGateway::new(&config))));
    tracing::info!(model = %gateway.model_id(), base_url = %config.base_url, "Completion gateway initialized");

    // Create application state
    let state = AppState::new(store, gateway);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Ember Chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
