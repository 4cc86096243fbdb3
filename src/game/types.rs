use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::logic::{GamePhase, GameState, PlayerTotal, RoundResult};

/// Request payload for setting up a game
#[derive(Debug, Deserialize)]
pub struct SetupGameRequest {
    pub players: Vec<String>,
}

/// Request payload for settling one round.
/// `scores` holds the (negative) entries of every player except the winner.
#[derive(Debug, Deserialize)]
pub struct PlayRoundRequest {
    pub winner: String,
    #[serde(default)]
    pub scores: HashMap<String, f64>,
}

/// Snapshot of the caller's game
#[derive(Debug, Serialize, Deserialize)]
pub struct GameView {
    pub phase: GamePhase,
    pub record_id: Option<String>,
    pub players: Vec<String>,
    pub current_round: usize,
    pub rounds: Vec<RoundResult>,
    pub totals: Vec<PlayerTotal>,
}

impl From<&GameState> for GameView {
    fn from(game: &GameState) -> Self {
        Self {
            phase: game.phase(),
            record_id: game.record_id().map(str::to_string),
            players: game.roster().to_vec(),
            current_round: game.current_round(),
            rounds: game.history().to_vec(),
            totals: game.player_totals(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoundResponse {
    pub round: usize,
    pub result: RoundResult,
    pub totals: Vec<PlayerTotal>,
}

/// Outcome of ending a game. The record is saved even when the report is not.
#[derive(Debug, Serialize, Deserialize)]
pub struct EndGameResponse {
    pub record_id: String,
    pub rounds: usize,
    pub totals: Vec<PlayerTotal>,
    pub ranking: Vec<PlayerTotal>,
    pub session_duration_secs: Option<i64>,
    pub report: Option<String>,
    pub report_error: Option<String>,
}
