use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use tracing::{info, instrument, warn};

use super::{
    origin::ClientOrigin,
    types::{
        CreateSessionRequest, LogoutResponse, SessionClaims, SessionInfoResponse, SessionResponse,
    },
};
use crate::shared::{AppError, AppState};

/// HTTP handler for creating a new session
///
/// POST /session
/// Body is optional; without a username the session is anonymous
#[instrument(name = "create_session", skip(state, body))]
pub async fn create_session(
    State(state): State<AppState>,
    origin: ClientOrigin,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => CreateSessionRequest::default(),
        Err(rejection) => return Err(AppError::BadRequest(rejection.body_text())),
    };

    info!(ip = %origin.ip, "Creating new session");

    let session = state
        .session_service
        .create_session(request, &origin)
        .await?;

    Ok(Json(session))
}

/// HTTP handler returning the caller's session details
///
/// GET /session
#[instrument(name = "session_info", skip(state, claims))]
pub async fn session_info(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<SessionInfoResponse>, AppError> {
    let session = state
        .session_service
        .get_session(&claims.session_id)
        .await?;

    Ok(Json(SessionInfoResponse {
        session_id: session.id,
        username: session.username,
        email: session.email,
        login_time: session.login_time,
        ip_address: session.ip_address,
        region: session.region,
    }))
}

/// HTTP handler for logging out
///
/// POST /logout
/// Records logout time and duration and discards any live game
#[instrument(name = "logout", skip(state, claims, origin))]
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    origin: ClientOrigin,
) -> Result<Json<LogoutResponse>, AppError> {
    if state.game_service.discard_game(&claims.session_id).await {
        warn!(session_id = %claims.session_id, "Discarding unfinished game on logout");
    }

    let session = state
        .session_service
        .end_session(&claims.session_id)
        .await?;

    info!(
        session_id = %session.id,
        username = %session.username,
        ip = %origin.ip,
        "Manual logout"
    );

    let logout_time = session.logout_time.ok_or(AppError::Internal)?;
    Ok(Json(LogoutResponse {
        session_id: session.id,
        logout_time,
        duration_secs: session.duration_secs.unwrap_or_default(),
    }))
}
