use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::logic::RoundResult;

pub const UNKNOWN_TOP_SCORER: &str = "Unknown";

/// Database model for the game_record table.
/// Roster, round history and totals are stored as JSON text.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct GameRecordModel {
    pub id: String,
    pub user_session_id: String,
    pub game_start_time: DateTime<Utc>,
    pub game_end_time: Option<DateTime<Utc>>,
    pub player_count: i32,
    pub player_names: String,
    pub round_scores: Option<String>,
    pub total_scores: Option<String>,
}

impl GameRecordModel {
    /// Creates a record for a game that starts now; history and totals are filled in at the end
    pub fn new(user_session_id: &str, roster: &[String]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_session_id: user_session_id.to_string(),
            game_start_time: Utc::now(),
            game_end_time: None,
            player_count: roster.len() as i32,
            player_names: serde_json::to_string(roster)?,
            round_scores: None,
            total_scores: None,
        })
    }

    /// Stamps the end time and snapshots the finished game
    pub fn complete(
        &mut self,
        history: &[RoundResult],
        totals: &BTreeMap<String, f64>,
    ) -> Result<(), serde_json::Error> {
        self.round_scores = Some(serde_json::to_string(history)?);
        self.total_scores = Some(serde_json::to_string(totals)?);
        self.game_end_time = Some(Utc::now());
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.game_end_time.is_some()
    }

    pub fn roster(&self) -> Vec<String> {
        serde_json::from_str(&self.player_names).unwrap_or_default()
    }

    /// Number of rounds in the stored history; 0 when absent or unreadable
    pub fn round_count(&self) -> usize {
        self.round_scores
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Vec<serde_json::Value>>(raw).ok())
            .map(|rounds| rounds.len())
            .unwrap_or(0)
    }

    pub fn totals(&self) -> Option<BTreeMap<String, f64>> {
        self.total_scores
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }

    /// Highest total, first in roster order on ties.
    /// Falls back to ("Unknown", 0.0) when totals are missing.
    pub fn top_scorer(&self) -> (String, f64) {
        let totals = match self.totals() {
            Some(totals) if !totals.is_empty() => totals,
            _ => return (UNKNOWN_TOP_SCORER.to_string(), 0.0),
        };

        let mut order = self.roster();
        for name in totals.keys() {
            if !order.contains(name) {
                order.push(name.clone());
            }
        }

        order
            .into_iter()
            .filter_map(|name| totals.get(&name).map(|total| (name, *total)))
            .fold(None, |best: Option<(String, f64)>, candidate| match best {
                Some(current) if current.1 >= candidate.1 => Some(current),
                _ => Some(candidate),
            })
            .unwrap_or_else(|| (UNKNOWN_TOP_SCORER.to_string(), 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::logic::GameState;
    use std::collections::HashMap;

    fn roster(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_record_has_start_time_only() {
        let record = GameRecordModel::new("session-1", &roster(&["Alice", "Bob"])).unwrap();

        assert!(!record.id.is_empty());
        assert_eq!(record.user_session_id, "session-1");
        assert_eq!(record.player_count, 2);
        assert_eq!(record.roster(), roster(&["Alice", "Bob"]));
        assert!(!record.is_finished());
        assert_eq!(record.round_count(), 0);
        assert_eq!(record.top_scorer(), ("Unknown".to_string(), 0.0));
    }

    #[test]
    fn test_complete_snapshots_history_and_totals() {
        let players = roster(&["Alice", "Bob", "Carol"]);
        let mut game = GameState::new();
        game.start(&players).unwrap();
        let scores: HashMap<String, f64> =
            [("Bob".to_string(), -3.0), ("Carol".to_string(), -2.0)].into();
        game.record_round("Alice", &scores).unwrap();

        let mut record = GameRecordModel::new("session-1", &players).unwrap();
        record.complete(game.history(), game.totals()).unwrap();

        assert!(record.is_finished());
        assert!(record.game_end_time.unwrap() >= record.game_start_time);
        assert_eq!(record.round_count(), 1);
        assert_eq!(record.top_scorer(), ("Alice".to_string(), 5.0));
    }

    #[test]
    fn test_top_scorer_tie_uses_roster_order() {
        let mut record = GameRecordModel::new("s", &roster(&["Zoe", "Adam"])).unwrap();
        record.total_scores = Some(r#"{"Adam": 0.0, "Zoe": 0.0}"#.to_string());

        assert_eq!(record.top_scorer(), ("Zoe".to_string(), 0.0));
    }

    #[test]
    fn test_unreadable_history_counts_as_empty() {
        let mut record = GameRecordModel::new("s", &roster(&["A"])).unwrap();
        record.round_scores = Some("not json".to_string());
        record.total_scores = Some("{broken".to_string());

        assert_eq!(record.round_count(), 0);
        assert_eq!(record.top_scorer(), ("Unknown".to_string(), 0.0));
    }
}
