//! System API endpoints: status and health.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SystemStatus};

/// GET /system/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let store = state.store();

    let database = match store.ping().await {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            tracing::warn!("Database ping failed: {e}");
            "unreachable".to_string()
        }
    };

    let users = store.user_count().await.unwrap_or(0);
    let teams = store.team_count().await.unwrap_or(0);

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        users,
        teams,
        database,
    })))
}

/// GET /system/health
/// Unauthenticated liveness probe.
pub async fn get_health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
