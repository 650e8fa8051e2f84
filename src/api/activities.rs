use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{AuthedUser, require_user};
use super::validation::validate_date;
use super::{
    ActivityDto, ActivityEntryDto, ApiError, ApiResponse, AppState, DayLogDto, LoggedActivityDto,
};

#[derive(Deserialize)]
pub struct LogActivityRequest {
    pub activity_id: i32,
    /// `YYYY-MM-DD`; defaults to today (UTC) when omitted.
    pub date: Option<String>,
}

pub async fn list_activities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ActivityDto>>>, ApiError> {
    let catalog = state.shared.activity_service.catalog().await?;

    Ok(Json(ApiResponse::success(
        catalog.into_iter().map(ActivityDto::from).collect(),
    )))
}

pub async fn log_activity(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Json(payload): Json<LogActivityRequest>,
) -> Result<Json<ApiResponse<LoggedActivityDto>>, ApiError> {
    let user = require_user(&state, &authed).await?;

    let logged = state
        .shared
        .activity_service
        .log(&user.id, payload.activity_id, payload.date.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(LoggedActivityDto {
        entry: ActivityEntryDto::from(logged.entry),
        daily_total: logged.daily_total,
    })))
}

pub async fn get_day_log(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Path(date): Path<String>,
) -> Result<Json<ApiResponse<DayLogDto>>, ApiError> {
    let date = validate_date(&date)?;
    let user = require_user(&state, &authed).await?;

    let day = state
        .shared
        .activity_service
        .day_log(&user.id, Some(date))
        .await?;

    Ok(Json(ApiResponse::success(DayLogDto {
        date: date.to_string(),
        entries: day.entries.into_iter().map(ActivityEntryDto::from).collect(),
        daily_total: day.daily_total,
    })))
}
