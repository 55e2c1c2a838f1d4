//! Practice session endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{SessionResponse, TranscriptRequest, TranscriptResponse, VerdictRequest};
use crate::AppState;

/// POST /api/learners/:learner_id/session
pub async fn start(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    let response = state.practice.start(learner_id).await?;
    tracing::info!(
        "Started session for learner {} with {} words",
        learner_id,
        response.snapshot.total_count
    );
    Ok(Json(response))
}

/// GET /api/learners/:learner_id/session
pub async fn snapshot(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    Ok(Json(state.practice.snapshot(learner_id).await?))
}

/// DELETE /api/learners/:learner_id/session
pub async fn end(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.practice.end(learner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/learners/:learner_id/session/verdict
/// Verdicts for a presentation that is no longer current are ignored.
pub async fn verdict(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
    Json(request): Json<VerdictRequest>,
) -> Result<Json<SessionResponse>> {
    Ok(Json(
        state
            .practice
            .verdict(learner_id, request.correct, request.presentation)
            .await?,
    ))
}

/// POST /api/learners/:learner_id/session/transcript
pub async fn transcript(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
    Json(request): Json<TranscriptRequest>,
) -> Result<Json<TranscriptResponse>> {
    let confidence = request.confidence.unwrap_or(1.0);
    Ok(Json(
        state
            .practice
            .transcript(learner_id, &request.text, confidence, request.presentation)
            .await?,
    ))
}

/// POST /api/learners/:learner_id/session/tick
pub async fn tick(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    Ok(Json(state.practice.tick(learner_id).await?))
}

/// POST /api/learners/:learner_id/session/advance
pub async fn advance(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    Ok(Json(state.practice.advance(learner_id).await?))
}

/// POST /api/learners/:learner_id/session/pause
pub async fn pause(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    Ok(Json(state.practice.pause(learner_id).await?))
}

/// POST /api/learners/:learner_id/session/resume
pub async fn resume(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    Ok(Json(state.practice.resume(learner_id).await?))
}

/// POST /api/learners/:learner_id/session/restart
pub async fn restart(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    Ok(Json(state.practice.restart(learner_id).await?))
}
