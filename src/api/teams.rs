use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{AuthedUser, require_user};
use super::validation::validate_team_id;
use super::{ApiError, ApiResponse, AppState, MemberDto, TeamDetailDto, TeamDto};

#[derive(Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    pub banner_url: Option<String>,
}

pub async fn list_teams(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TeamDto>>>, ApiError> {
    let teams = state.shared.team_service.list().await?;

    Ok(Json(ApiResponse::success(
        teams.into_iter().map(TeamDto::from).collect(),
    )))
}

pub async fn create_team(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Json(payload): Json<CreateTeamRequest>,
) -> Result<Json<ApiResponse<TeamDto>>, ApiError> {
    let user = require_user(&state, &authed).await?;

    let team = state
        .shared
        .team_service
        .create(&user, &payload.name, payload.banner_url.as_deref())
        .await?;

    tracing::info!("User {} created team '{}'", user.email, team.name);

    Ok(Json(ApiResponse::success(TeamDto::from(team))))
}

pub async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TeamDetailDto>>, ApiError> {
    let id = validate_team_id(&id)?;

    let detail = state.shared.team_service.detail(id).await?;

    Ok(Json(ApiResponse::success(TeamDetailDto {
        team: TeamDto::from(detail.team),
        members: detail.members.into_iter().map(MemberDto::from).collect(),
    })))
}

pub async fn join_team(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TeamDto>>, ApiError> {
    let id = validate_team_id(&id)?;
    let user = require_user(&state, &authed).await?;

    let team = state.shared.team_service.join(&user, id).await?;

    tracing::info!("User {} joined team '{}'", user.email, team.name);

    Ok(Json(ApiResponse::success(TeamDto::from(team))))
}

pub async fn leave_team(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = require_user(&state, &authed).await?;

    state.shared.team_service.leave(&user).await?;

    tracing::info!("User {} left their team", user.email);

    Ok(Json(ApiResponse::success(())))
}
