use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_team_id;
use super::{ApiError, ApiResponse, AppState};
use crate::services::{BonusRecordEntry, EvaluationOutcome};

#[derive(Deserialize)]
pub struct EvaluateRequest {
    /// `YYYY-MM-DD` UTC calendar day to evaluate.
    pub date: String,
}

/// POST /teams/{id}/bonus/evaluate
///
/// Runs the team bonus check for one day. Safe to call repeatedly: an
/// already-recorded day reports the stored outcome without crediting again.
pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<EvaluateRequest>,
) -> Result<Json<ApiResponse<EvaluationOutcome>>, ApiError> {
    let id = validate_team_id(&id)?;

    let outcome = state
        .shared
        .bonus_service
        .evaluate(id, &payload.date)
        .await?;

    Ok(Json(ApiResponse::success(outcome)))
}

/// GET /teams/{id}/bonus/history
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<BonusRecordEntry>>>, ApiError> {
    let id = validate_team_id(&id)?;

    let records = state.shared.bonus_service.history(id).await?;

    Ok(Json(ApiResponse::success(records)))
}
