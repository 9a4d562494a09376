mod config;
mod errors;
mod extraction;
mod jobs;
mod llm_client;
mod matching;
mod models;
mod pipeline;
mod resumes;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::{FileExtractor, MockExtractor, TextExtractor};
use crate::llm_client::LlmClient;
use crate::matching::LlmClassifier;
use crate::pipeline::{Pipeline, PipelineContext};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::memory::MemStorage;
use crate::storage::postgres::PgStorage;
use crate::storage::Storage;

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

    info!("Starting resume match API v{}", env!("CARGO_PKG_VERSION"));

    // Pick the storage backend
    let storage: Arc<dyn Storage> = match &config.database_url {
        Some(url) => Arc::new(PgStorage::connect(url).await?),
        None => {
            info!("DATABASE_URL not set, using in-memory storage");
            Arc::new(MemStorage::new())
        }
    };

    // Seed the job list (skipped when the store already has jobs)
    jobs::seed::seed_jobs(storage.as_ref()).await?;

    // Spool directory for uploads awaiting processing
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    // Extraction backend: fixture text or real document reading
    let extractor: Arc<dyn TextExtractor> = if config.mock_extraction {
        info!("MOCK_EXTRACTION enabled, serving fixture resume text");
        Arc::new(MockExtractor)
    } else {
        Arc::new(FileExtractor)
    };

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Start the bounded processing pool
    let pipeline = Pipeline::start(
        PipelineContext {
            storage: Arc::clone(&storage),
            extractor,
            classifier: Arc::new(LlmClassifier::new(llm)),
        },
        config.worker_count,
        config.queue_capacity,
    );
    info!(
        workers = config.worker_count,
        capacity = config.queue_capacity,
        "pipeline workers started"
    );

    // Build app state
    let state = AppState {
        storage,
        pipeline: pipeline.handle(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain in-flight pipeline work before exiting
    pipeline.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received CTRL+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
