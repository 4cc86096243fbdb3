use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminLoginResponse {
    pub token: String,
}

/// One row of the admin overview
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSummary {
    pub id: String,
    pub username: String,
    pub game_start_time: DateTime<Utc>,
    pub game_end_time: Option<DateTime<Utc>>,
    pub player_count: i32,
    pub round_count: usize,
    pub top_scorer: String,
    pub top_score: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminStatsResponse {
    pub total_games: usize,
    pub total_rounds: usize,
    pub games: Vec<GameSummary>,
}
