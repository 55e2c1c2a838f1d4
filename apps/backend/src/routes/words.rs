//! Word list endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::{AddWordsRequest, AddWordsResponse, WordListResponse};
use crate::AppState;

/// GET /api/learners/:learner_id/words
pub async fn list(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
) -> Result<Json<WordListResponse>> {
    let words = state.store.list_words(learner_id)?;
    Ok(Json(WordListResponse { words }))
}

/// POST /api/learners/:learner_id/words
pub async fn add(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
    Json(request): Json<AddWordsRequest>,
) -> Result<Json<AddWordsResponse>> {
    if request.words.iter().all(|w| w.trim().is_empty()) {
        return Err(ApiError::BadRequest("No words given".to_string()));
    }

    let added = state.store.add_words(learner_id, &request.words, Utc::now())?;
    tracing::info!("Added {} words for learner {}", added.len(), learner_id);

    Ok(Json(AddWordsResponse { added }))
}
