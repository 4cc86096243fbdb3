use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use tracing::{info, instrument};

use super::types::{
    EndGameResponse, GameView, PlayRoundRequest, RoundResponse, SetupGameRequest,
};
use crate::session::SessionClaims;
use crate::shared::{AppError, AppState};

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(request)| request)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// HTTP handler for setting up a game
///
/// POST /game/setup
/// Fixes the roster and opens a game record
#[instrument(name = "setup_game", skip(state, claims, body), fields(session_id = %claims.session_id))]
pub async fn setup_game(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    body: Result<Json<SetupGameRequest>, JsonRejection>,
) -> Result<Json<GameView>, AppError> {
    let request = json_body(body)?;
    info!(player_count = request.players.len(), "Setting up game");

    let view = state
        .game_service
        .setup_game(&claims.session_id, &request.players)
        .await?;

    Ok(Json(view))
}

/// HTTP handler returning the caller's game
///
/// GET /game
#[instrument(name = "current_game", skip(state, claims), fields(session_id = %claims.session_id))]
pub async fn current_game(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<GameView>, AppError> {
    let view = state.game_service.current_game(&claims.session_id).await?;
    Ok(Json(view))
}

/// HTTP handler for settling a round
///
/// POST /game/rounds
#[instrument(name = "play_round", skip(state, claims, body), fields(session_id = %claims.session_id))]
pub async fn play_round(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    body: Result<Json<PlayRoundRequest>, JsonRejection>,
) -> Result<Json<RoundResponse>, AppError> {
    let request = json_body(body)?;

    let round = state
        .game_service
        .play_round(&claims.session_id, request)
        .await?;

    Ok(Json(round))
}

/// HTTP handler for ending the game
///
/// POST /game/end
/// Saves the record, closes the session and links the scorecard
#[instrument(name = "end_game", skip(state, claims), fields(session_id = %claims.session_id))]
pub async fn end_game(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<EndGameResponse>, AppError> {
    let summary = state.game_service.end_game(&claims.session_id).await?;

    info!(
        record_id = %summary.record_id,
        rounds = summary.rounds,
        report = ?summary.report,
        "Game ended"
    );

    Ok(Json(summary))
}
