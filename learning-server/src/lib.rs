//! learning-server library
//!
//! HTTP service behind the learning-app browser UI: video processing,
//! sources, sessions and LLM-backed challenges.

pub mod api;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use learning_common::config::ModelConfig;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::{LlmClient, TranscriptSource, VideoMetadataSource};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub llm: Arc<dyn LlmClient>,
    pub transcripts: Arc<dyn TranscriptSource>,
    pub metadata: Arc<dyn VideoMetadataSource>,
    /// Model and token budget per LLM task
    pub models: ModelConfig,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        llm: Arc<dyn LlmClient>,
        transcripts: Arc<dyn TranscriptSource>,
        metadata: Arc<dyn VideoMetadataSource>,
        models: ModelConfig,
    ) -> Self {
        Self {
            db,
            llm,
            transcripts,
            metadata,
            models,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::youtube_routes())
        .merge(api::source_routes())
        .merge(api::session_routes())
        .merge(api::challenge_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
