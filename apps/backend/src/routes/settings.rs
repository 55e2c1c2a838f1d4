//! Learner settings endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::models::{LearnerSettings, UpdateSettingsRequest};
use crate::AppState;

/// GET /api/learners/:learner_id/settings
pub async fn get(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
) -> Json<LearnerSettings> {
    Json(state.practice.settings(learner_id).await)
}

/// PUT /api/learners/:learner_id/settings
pub async fn update(
    State(state): State<AppState>,
    Path(learner_id): Path<Uuid>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Json<LearnerSettings> {
    let current = state.practice.settings(learner_id).await;
    let updated = request.apply(current);
    Json(state.practice.save_settings(learner_id, updated).await)
}
