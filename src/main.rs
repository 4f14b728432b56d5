use paperdock::config::AppConfig;
use paperdock::db::{MemoryPaperStore, PaperStore, Repository};
use paperdock::llm::{ChatCompletionsClient, LlmClient, MockLlm};
use paperdock::metadata::ExtractionPolicy;
use paperdock::services::AppState;
use paperdock::storage::{BlobStore, FsBlobStore, MemoryBlobStore};
use paperdock::{metrics, routes};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Graceful shutdown signal handler
/// Listens for SIGINT (Ctrl+C) and SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, starting shutdown..."),
        _ = terminate => tracing::info!("Received SIGTERM, starting shutdown..."),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    dotenvy::dotenv().ok();
    let config = AppConfig::build().expect("failed to load configuration");

    // 2. Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.rust_log))
        .init();

    tracing::info!(version = paperdock::VERSION, "Starting paperdock...");

    // 3. Paper store
    let store: Arc<dyn PaperStore> = if config.database.url == "memory" {
        tracing::warn!("Using in-memory paper store - not for production use");
        Arc::new(MemoryPaperStore::new())
    } else {
        let repo = Repository::connect(&config.database).await?;
        tracing::info!("Connected to database");
        Arc::new(repo)
    };

    // 4. Blob store
    let blobs: Arc<dyn BlobStore> = if config.storage.root == "memory" {
        tracing::warn!("Using in-memory blob store - not for production use");
        Arc::new(MemoryBlobStore::new())
    } else {
        Arc::new(FsBlobStore::new(&config.storage.root))
    };

    // 5. LLM client
    let llm: Arc<dyn LlmClient> = if config.llm.api_key == "mock" {
        tracing::warn!("Using mock LLM client - not for production use");
        Arc::new(MockLlm::new())
    } else {
        Arc::new(ChatCompletionsClient::new(config.llm.clone())?)
    };
    tracing::info!(model = llm.model_name(), "LLM client ready");

    // 6. App state and router
    let policy = ExtractionPolicy {
        max_attempts: config.llm.max_attempts.max(1),
    };
    let state = AppState::new(store, blobs, llm, policy);
    let app = routes::create_router(state).merge(metrics::router());

    // 7. Serve with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
