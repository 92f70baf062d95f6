//! HTTP server for recording analysis
//!
//! - POST /analyze - multipart upload (`video`, `questionText`), returns the score
//! - GET /health - liveness probe

mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::analyzer::{AudioAnalyzer, VideoAnalyzer};
use crate::config::ServerConfig;
use crate::pipeline::AnalysisPipeline;

pub use handlers::{analyze_handler, health_handler};

// ============================================================================
// Server State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub pipeline: AnalysisPipeline,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        video: Arc<dyn VideoAnalyzer>,
        audio: Arc<dyn AudioAnalyzer>,
    ) -> Self {
        let pipeline = AnalysisPipeline::new(video, audio, config.analysis_timeout);
        Self {
            config: Arc::new(config),
            pipeline,
        }
    }
}

// ============================================================================
// Routes
// ============================================================================

/// Create the router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // The default 2MB limit would reject most recordings
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/analyze", post(handlers::analyze_handler).layer(upload_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until Ctrl+C or SIGTERM
pub async fn run(state: AppState) -> Result<()> {
    state.config.prepare_upload_dir().with_context(|| {
        format!(
            "Failed to create upload directory {}",
            state.config.upload_dir.display()
        )
    })?;

    let bind_address = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!("Server listening on http://{}", bind_address);
    info!(
        max_upload_mb = state.config.max_upload_bytes / (1024 * 1024),
        timeout = ?state.config.analysis_timeout,
        "Analyze endpoint: POST /analyze"
    );

    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler for SIGTERM and Ctrl+C
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
}
