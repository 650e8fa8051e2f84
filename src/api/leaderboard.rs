use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_limit;
use super::{ApiError, ApiResponse, AppState};
use crate::constants::limits::DEFAULT_LEADERBOARD_LIMIT;
use crate::services::LeaderboardRow;

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

pub async fn team_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<ApiResponse<Vec<LeaderboardRow>>>, ApiError> {
    let limit = validate_limit(query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT))?;

    let rows = state.shared.leaderboard_service.teams(limit).await?;

    Ok(Json(ApiResponse::success(rows)))
}

pub async fn user_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<ApiResponse<Vec<LeaderboardRow>>>, ApiError> {
    let limit = validate_limit(query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT))?;

    let rows = state.shared.leaderboard_service.users(limit).await?;

    Ok(Json(ApiResponse::success(rows)))
}
