use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{info, instrument};

use super::types::{AdminLoginRequest, AdminLoginResponse, AdminStatsResponse};
use crate::session::ClientOrigin;
use crate::shared::{AppError, AppState};

/// HTTP handler for admin login
///
/// POST /admin/login
#[instrument(name = "admin_login", skip(state, origin, body))]
pub async fn admin_login(
    State(state): State<AppState>,
    origin: ClientOrigin,
    body: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> Result<Json<AdminLoginResponse>, AppError> {
    let Json(request) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let token = state
        .admin_service
        .login(&request.username, &request.password, &origin)
        .await?;

    Ok(Json(AdminLoginResponse { token }))
}

/// HTTP handler for the statistics overview
///
/// GET /admin/stats
#[instrument(name = "admin_stats", skip(state))]
pub async fn admin_stats(
    State(state): State<AppState>,
) -> Result<Json<AdminStatsResponse>, AppError> {
    let stats = state.admin_service.stats().await?;
    info!(total_games = stats.total_games, "Admin stats served");
    Ok(Json(stats))
}
