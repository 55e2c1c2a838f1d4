//! Matching and capability endpoints

use axum::{extract::State, Json};

use crate::models::{CapabilitiesResponse, MatchRequest, MatchResult};
use crate::AppState;

/// GET /api/capabilities
/// Reports which answer paths clients can offer. Manual verdicts always work;
/// speech is recognized on the client, which posts transcripts to the session.
pub async fn capabilities(State(state): State<AppState>) -> Json<CapabilitiesResponse> {
    Json(CapabilitiesResponse {
        speech_recognition: state.config.speech_recognition,
    })
}

/// POST /api/match
pub async fn evaluate(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Json<MatchResult> {
    Json(state.evaluator.evaluate_detailed(&request.spoken, &request.target))
}
