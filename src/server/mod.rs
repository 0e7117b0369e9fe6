//! HTTP server for exam generation

pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServerConfig;
use crate::error::{ExamGeneratorError, Result};
use crate::processing::ExamPipeline;
use state::AppState;

pub struct ExamServer {
    config: ServerConfig,
    state: AppState,
}

impl ExamServer {
    pub fn new(config: ServerConfig, pipeline: Arc<ExamPipeline>) -> Self {
        Self {
            config,
            state: AppState::new(pipeline),
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.config.max_upload_bytes)
    }

    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| ExamGeneratorError::Configuration(format!("Invalid address: {}", e)))?;

        let router = self.router();

        log::info!("Starting exam generator on http://{}", addr);
        log::info!("Upload endpoint: POST http://{}/generate_exam/", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ExamGeneratorError::Configuration(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ExamGeneratorError::Processing(format!("Server error: {}", e)))?;

        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }
}

/// Build the router with all routes
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health_check))
        .route("/generate_exam/", post(routes::generate_exam))
        .route("/generate_exam", post(routes::generate_exam))
        .with_state(state)
        // Overrides axum's 2 MB default; hits surface through the multipart reader
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
}
