//! Session endpoints
//!
//! A session is created when the viewer asks to be checked and completed
//! once the challenge is done.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use learning_common::db::{Session, SessionStatus};
use learning_common::{ChallengeFlow, ChallengeStep};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{present, ApiJson, ApiQuery};
use crate::db::{problems, sessions, sources};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointQuery {
    pub viewer_id: Option<String>,
    pub source_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointResponse {
    /// End of the newest completed session, 0 when there is none
    pub last_checkpoint: f64,
    pub last_session: Option<Session>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub viewer_id: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: Session,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub session_id: String,
    pub step: ChallengeStep,
    pub current: usize,
    pub total: usize,
    pub percent: f64,
}

/// GET /api/sessions?viewerId=&sourceId=
pub async fn get_checkpoint(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CheckpointQuery>,
) -> ApiResult<Json<CheckpointResponse>> {
    let (Some(viewer_id), Some(source_id)) = (present(&query.viewer_id), present(&query.source_id))
    else {
        return Err(ApiError::BadRequest("viewerId and sourceId are required".to_string()));
    };

    let last_session = sessions::latest_completed(&state.db, viewer_id, source_id).await?;

    Ok(Json(CheckpointResponse {
        last_checkpoint: last_session.as_ref().map(|s| s.end_time).unwrap_or(0.0),
        last_session,
    }))
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateSessionRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let (Some(viewer_id), Some(source_id), Some(start_time), Some(end_time)) = (
        present(&payload.viewer_id),
        present(&payload.source_id),
        payload.start_time,
        payload.end_time,
    ) else {
        return Err(ApiError::BadRequest(
            "viewerId, sourceId, startTime, and endTime are required".to_string(),
        ));
    };

    if !start_time.is_finite() || !end_time.is_finite() || start_time < 0.0 || end_time < start_time {
        return Err(ApiError::BadRequest("Invalid time range".to_string()));
    }

    if sources::get_source(&state.db, source_id).await?.is_none() {
        return Err(ApiError::NotFound("Source not found".to_string()));
    }

    let session = sessions::create_session(&state.db, viewer_id, source_id, start_time, end_time).await?;
    info!(
        session_id = %session.id,
        source_id = %source_id,
        start_time = start_time,
        end_time = end_time,
        "Session started"
    );

    Ok(Json(SessionResponse { session }))
}

/// PATCH /api/sessions
pub async fn update_session(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UpdateSessionRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let (Some(session_id), Some(status)) = (present(&payload.session_id), present(&payload.status))
    else {
        return Err(ApiError::BadRequest("sessionId and status are required".to_string()));
    };

    let status: SessionStatus = status.parse()?;

    let session = sessions::update_status(&state.db, session_id, status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;
    info!(session_id = %session.id, status = %session.status, "Session updated");

    Ok(Json(SessionResponse { session }))
}

/// GET /api/sessions/:id/progress
pub async fn get_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProgressResponse>> {
    if sessions::get_session(&state.db, &id).await?.is_none() {
        return Err(ApiError::NotFound("Session not found".to_string()));
    }

    let problems = problems::list_for_session(&state.db, &id).await?;
    let evaluated = problems.iter().filter(|p| p.is_evaluated()).count();
    let flow = ChallengeFlow::from_progress(problems.len(), evaluated);

    Ok(Json(ProgressResponse {
        session_id: id,
        step: flow.step,
        current: flow.current,
        total: flow.total,
        percent: flow.progress_percent(),
    }))
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/sessions",
            get(get_checkpoint).post(create_session).patch(update_session),
        )
        .route("/api/sessions/:id/progress", get(get_progress))
}
