//! Video processing endpoint
//!
//! POST /api/youtube/process turns a pasted URL into a stored source:
//! transcript, title, thumbnail and suggested breakpoints.

use axum::{extract::State, routing::post, Json, Router};
use learning_common::db::Source;
use learning_common::transcript::{estimate_duration, format_transcript};
use learning_common::youtube::{extract_video_id, watch_url};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::ApiJson;
use crate::db::sources::{self, NewSource};
use crate::services::breakpoint_analyzer::analyze_breakpoints;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SourceResponse {
    pub source: Source,
}

/// POST /api/youtube/process
///
/// A video seen before is returned as stored without any external calls.
pub async fn process_video(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ProcessRequest>,
) -> ApiResult<Json<SourceResponse>> {
    let url = super::present(&payload.url)
        .ok_or_else(|| ApiError::BadRequest("YouTube URL is required".to_string()))?;

    let video_id = extract_video_id(url)
        .ok_or_else(|| ApiError::BadRequest("Invalid YouTube URL".to_string()))?;

    if let Some(source) = sources::find_by_video_id(&state.db, &video_id).await? {
        info!(video_id = %video_id, "Video already processed");
        return Ok(Json(SourceResponse { source }));
    }

    let segments = state.transcripts.fetch(&video_id).await.map_err(|e| {
        warn!("Transcript fetch failed for {}: {:?}", video_id, e);
        ApiError::BadRequest(e.to_string())
    })?;
    let transcript = format_transcript(&segments);
    let duration = estimate_duration(&segments);

    let metadata = state.metadata.fetch(&video_id).await;

    let breakpoints =
        analyze_breakpoints(state.llm.as_ref(), &state.models.breakpoints, &transcript, duration).await;
    let breakpoints = serde_json::to_string(&breakpoints).map_err(learning_common::Error::from)?;

    let source = sources::insert_source(
        &state.db,
        NewSource {
            title: metadata.title,
            url: watch_url(&video_id),
            video_id: video_id.clone(),
            transcript,
            duration,
            thumbnail: metadata.thumbnail,
            breakpoints: Some(breakpoints),
        },
    )
    .await?;

    info!(
        video_id = %video_id,
        source_id = %source.id,
        duration = source.duration,
        "Processed video"
    );

    Ok(Json(SourceResponse { source }))
}

pub fn youtube_routes() -> Router<AppState> {
    Router::new().route("/api/youtube/process", post(process_video))
}
