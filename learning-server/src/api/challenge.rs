//! Challenge endpoints: problem generation and answer evaluation

use axum::{extract::State, routing::post, Json, Router};
use learning_common::db::Problem;
use learning_common::questions::{format_answer_for_submission, is_answer_valid};
use learning_common::transcript::{extract_range, truncate_chars, CHALLENGE_PROMPT_CHARS};
use learning_common::Answer;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::{present, ApiJson};
use crate::db::{problems, sessions, sources};
use crate::services::challenge::{evaluate_answer, generate_problems};
use crate::services::prompts::describe_question;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub problems: Vec<Problem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    #[serde(default)]
    pub problem_id: Option<String>,
    #[serde(default)]
    pub answer: Option<Answer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    pub is_correct: bool,
    pub feedback: String,
    pub next_step: String,
    /// Unevaluated problems left in the session
    pub remaining: i64,
}

fn require_llm(state: &AppState) -> ApiResult<()> {
    if state.llm.is_configured() {
        Ok(())
    } else {
        Err(ApiError::Internal("ANTHROPIC_API_KEY is not set".to_string()))
    }
}

/// POST /api/challenge/generate
///
/// Problems already stored for the session are returned as they are.
pub async fn generate(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let session_id = present(&payload.session_id)
        .ok_or_else(|| ApiError::BadRequest("sessionId is required".to_string()))?;

    require_llm(&state)?;

    let session = sessions::get_session(&state.db, session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;

    let existing = problems::list_for_session(&state.db, &session.id).await?;
    if !existing.is_empty() {
        info!(session_id = %session.id, count = existing.len(), "Returning stored problems");
        return Ok(Json(GenerateResponse { problems: existing }));
    }

    let source = sources::get_source(&state.db, &session.source_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Source not found".to_string()))?;

    let range = extract_range(&source.transcript, session.start_time, session.end_time);
    let excerpt = if range.is_empty() {
        truncate_chars(&source.transcript, CHALLENGE_PROMPT_CHARS)
    } else {
        truncate_chars(&range, CHALLENGE_PROMPT_CHARS)
    };

    let specs = generate_problems(state.llm.as_ref(), &state.models.challenge, &source.title, excerpt)
        .await
        .map_err(|e| {
            error!("Challenge generation failed for session {}: {}", session.id, e);
            ApiError::Internal("Failed to generate challenges".to_string())
        })?;

    let stored = match problems::insert_problems(&state.db, &session.id, &specs).await {
        Ok(stored) => stored,
        // A concurrent request stored its problems first
        Err(e) if crate::db::is_unique_violation(&e) => {
            problems::list_for_session(&state.db, &session.id).await?
        }
        Err(e) => return Err(e.into()),
    };

    info!(session_id = %session.id, count = stored.len(), "Generated problems");
    Ok(Json(GenerateResponse { problems: stored }))
}

/// POST /api/challenge/evaluate
pub async fn evaluate(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<EvaluateRequest>,
) -> ApiResult<Json<EvaluateResponse>> {
    let (Some(problem_id), Some(answer)) = (present(&payload.problem_id), payload.answer.as_ref())
    else {
        return Err(ApiError::BadRequest("problemId and answer are required".to_string()));
    };

    require_llm(&state)?;

    let problem = problems::get_problem(&state.db, problem_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Problem not found".to_string()))?;

    if problem.is_evaluated() {
        return Err(ApiError::Conflict(
            "Problem has already been evaluated".to_string(),
        ));
    }

    if !is_answer_valid(&problem, answer) {
        return Err(ApiError::BadRequest(
            "Answer is not valid for this question type".to_string(),
        ));
    }

    let submission = format_answer_for_submission(&problem, answer);
    let question = describe_question(&problem, &problem.text);

    let evaluation = evaluate_answer(state.llm.as_ref(), &state.models.evaluation, &question, &submission)
        .await
        .map_err(|e| {
            error!("Evaluation failed for problem {}: {}", problem.id, e);
            ApiError::Internal("Failed to evaluate answer".to_string())
        })?;

    // A concurrent submission for the same problem may have been stored first
    problems::record_evaluation(&state.db, &problem.id, &submission, &evaluation)
        .await?
        .ok_or_else(|| ApiError::Conflict("Problem has already been evaluated".to_string()))?;
    let remaining = problems::count_unevaluated(&state.db, &problem.session_id).await?;

    info!(
        problem_id = %problem.id,
        is_correct = evaluation.is_correct,
        remaining = remaining,
        "Answer evaluated"
    );

    Ok(Json(EvaluateResponse {
        is_correct: evaluation.is_correct,
        feedback: evaluation.feedback,
        next_step: evaluation.next_step,
        remaining,
    }))
}

pub fn challenge_routes() -> Router<AppState> {
    Router::new()
        .route("/api/challenge/generate", post(generate))
        .route("/api/challenge/evaluate", post(evaluate))
}
