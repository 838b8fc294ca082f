//! Source listing, detail and study notes

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use learning_common::breakpoints::{effective_breakpoints, next_breakpoint, Breakpoint};
use learning_common::concepts::{extract_key_concepts, KeyConcept};
use learning_common::db::{Source, SourceWithSessions};
use learning_common::transcript::extract_range;
use serde::{Deserialize, Serialize};

use super::ApiQuery;
use crate::db::{sessions, sources};
use crate::{ApiError, ApiResult, AppState};

/// Sources shown on the home page
const RECENT_SOURCES: i64 = 10;

/// Key concepts per notes request
const KEY_CONCEPT_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
pub struct SourceListResponse {
    pub sources: Vec<SourceWithSessions>,
}

#[derive(Debug, Serialize)]
pub struct SourceDetailResponse {
    pub source: SourceWithSessions,
}

#[derive(Debug, Deserialize)]
pub struct NotesQuery {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

/// Study notes for one time range of a video
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesResponse {
    pub source_id: String,
    pub start: f64,
    pub end: f64,
    pub excerpt: String,
    pub key_concepts: Vec<KeyConcept>,
    pub next_breakpoint: Option<Breakpoint>,
}

async fn load_source(state: &AppState, id: &str) -> ApiResult<Source> {
    sources::get_source(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Source not found".to_string()))
}

/// GET /api/sources
///
/// Newest sources, each with its latest session.
pub async fn list_sources(State(state): State<AppState>) -> ApiResult<Json<SourceListResponse>> {
    let recent = sources::list_recent(&state.db, RECENT_SOURCES).await?;

    let mut result = Vec::with_capacity(recent.len());
    for source in recent {
        let sessions = sessions::list_for_source(&state.db, &source.id, Some(1)).await?;
        result.push(SourceWithSessions { source, sessions });
    }

    Ok(Json(SourceListResponse { sources: result }))
}

/// GET /api/sources/:id
pub async fn get_source(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SourceDetailResponse>> {
    let source = load_source(&state, &id).await?;
    let sessions = sessions::list_for_source(&state.db, &source.id, None).await?;

    Ok(Json(SourceDetailResponse {
        source: SourceWithSessions { source, sessions },
    }))
}

/// GET /api/sources/:id/notes?start=&end=
///
/// Defaults to the whole video.
pub async fn get_notes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<NotesQuery>,
) -> ApiResult<Json<NotesResponse>> {
    let source = load_source(&state, &id).await?;

    let start = query.start.unwrap_or(0.0);
    let end = query.end.unwrap_or(source.duration as f64);
    if !start.is_finite() || !end.is_finite() || start < 0.0 || end < start {
        return Err(ApiError::BadRequest("Invalid time range".to_string()));
    }

    let excerpt = extract_range(&source.transcript, start, end);
    let key_concepts = extract_key_concepts(&excerpt, KEY_CONCEPT_LIMIT);
    let breakpoints = effective_breakpoints(source.breakpoints.as_deref(), source.duration as f64);

    Ok(Json(NotesResponse {
        source_id: source.id,
        start,
        end,
        excerpt,
        key_concepts,
        next_breakpoint: next_breakpoint(&breakpoints, start).cloned(),
    }))
}

pub fn source_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sources", get(list_sources))
        .route("/api/sources/:id", get(get_source))
        .route("/api/sources/:id/notes", get(get_notes))
}
