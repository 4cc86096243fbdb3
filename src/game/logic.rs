// A round is settled by picking one winner; everyone else enters a strictly
// negative score and the winner takes the negated sum, so each round nets to zero.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use strum_macros::Display;

/// Tolerance used when checking that a round or a game nets to zero
pub const ZERO_SUM_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("Winner {0} is not in the roster")]
    UnknownWinner(String),
    #[error("Player {0} is not in the roster")]
    UnknownPlayer(String),
    #[error("Missing score for player {0}")]
    MissingScore(String),
    #[error("Score for player {player} must be negative, got {value}")]
    InvalidScore { player: String, value: f64 },
    #[error("Scores are too large to add up")]
    ScoreOverflow,
    #[error("A game needs at least one player")]
    EmptyRoster,
    #[error("Player {0} has no name")]
    BlankPlayerName(usize),
    #[error("Player name {0} is used more than once")]
    DuplicatePlayer(String),
    #[error("Game has already been set up")]
    AlreadyStarted,
    #[error("No game in progress")]
    NotInProgress,
}

/// Scores of one settled round in roster order.
/// Serialized as a JSON object whose keys follow the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub winner: String,
    #[serde(with = "ordered_scores")]
    pub scores: Vec<(String, f64)>,
}

impl RoundResult {
    pub fn score(&self, player: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|(name, _)| name == player)
            .map(|(_, value)| *value)
    }

    pub fn sum(&self) -> f64 {
        self.scores.iter().map(|(_, value)| value).sum()
    }

    pub fn is_zero_sum(&self) -> bool {
        self.sum().abs() < ZERO_SUM_EPSILON
    }
}

/// Settles a single round for `roster`.
///
/// Every non-winner must have a strictly negative entry. An entry for the
/// winner is ignored since the winner's score is always derived.
pub fn settle_round(
    winner: &str,
    entered_scores: &HashMap<String, f64>,
    roster: &[String],
) -> Result<RoundResult, ScoringError> {
    if !roster.iter().any(|p| p == winner) {
        return Err(ScoringError::UnknownWinner(winner.to_string()));
    }

    if let Some(unknown) = entered_scores
        .keys()
        .filter(|name| !roster.contains(name))
        .min()
    {
        return Err(ScoringError::UnknownPlayer(unknown.clone()));
    }

    let mut scores = Vec::with_capacity(roster.len());
    let mut losses = 0.0;

    for player in roster {
        if player == winner {
            scores.push((player.clone(), 0.0));
            continue;
        }

        let value = *entered_scores
            .get(player)
            .ok_or_else(|| ScoringError::MissingScore(player.clone()))?;

        if !value.is_finite() || value >= 0.0 {
            return Err(ScoringError::InvalidScore {
                player: player.clone(),
                value,
            });
        }

        losses += value;
        scores.push((player.clone(), value));
    }

    if !losses.is_finite() {
        return Err(ScoringError::ScoreOverflow);
    }
    for (name, value) in scores.iter_mut() {
        if name.as_str() == winner {
            *value = -losses;
        }
    }

    Ok(RoundResult {
        winner: winner.to_string(),
        scores,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    AwaitingSetup,
    InProgress,
    Ended,
}

/// Player name and cumulative score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerTotal {
    pub name: String,
    pub total: f64,
}

/// Per-session game state: roster, round history and running totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    phase: GamePhase,
    roster: Vec<String>,
    history: Vec<RoundResult>,
    totals: BTreeMap<String, f64>,
    record_id: Option<String>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::AwaitingSetup,
            roster: Vec::new(),
            history: Vec::new(),
            totals: BTreeMap::new(),
            record_id: None,
        }
    }

    /// Fixes the roster and moves the game into play
    pub fn start(&mut self, roster: &[String]) -> Result<(), ScoringError> {
        if self.phase != GamePhase::AwaitingSetup {
            return Err(ScoringError::AlreadyStarted);
        }
        if roster.is_empty() {
            return Err(ScoringError::EmptyRoster);
        }

        let mut names = Vec::with_capacity(roster.len());
        let mut seen = HashSet::new();
        for (index, raw) in roster.iter().enumerate() {
            let name = raw.trim();
            if name.is_empty() {
                return Err(ScoringError::BlankPlayerName(index + 1));
            }
            if !seen.insert(name) {
                return Err(ScoringError::DuplicatePlayer(name.to_string()));
            }
            names.push(name.to_string());
        }

        self.totals = names.iter().map(|name| (name.clone(), 0.0)).collect();
        self.roster = names;
        self.history.clear();
        self.phase = GamePhase::InProgress;
        Ok(())
    }

    /// Settles a round and folds it into the totals.
    /// Nothing is changed when the settlement is rejected.
    pub fn record_round(
        &mut self,
        winner: &str,
        entered_scores: &HashMap<String, f64>,
    ) -> Result<RoundResult, ScoringError> {
        if self.phase != GamePhase::InProgress {
            return Err(ScoringError::NotInProgress);
        }

        let result = settle_round(winner, entered_scores, &self.roster)?;

        let mut totals = self.totals.clone();
        for (player, value) in &result.scores {
            *totals.entry(player.clone()).or_insert(0.0) += value;
        }
        if totals.values().any(|total| !total.is_finite()) {
            return Err(ScoringError::ScoreOverflow);
        }

        self.totals = totals;
        self.history.push(result.clone());
        Ok(result)
    }

    /// Closes the game; no more rounds are accepted afterwards
    pub fn finish(&mut self) -> Result<&GameState, ScoringError> {
        if self.phase != GamePhase::InProgress {
            return Err(ScoringError::NotInProgress);
        }
        self.phase = GamePhase::Ended;
        Ok(self)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    pub fn history(&self) -> &[RoundResult] {
        &self.history
    }

    pub fn totals(&self) -> &BTreeMap<String, f64> {
        &self.totals
    }

    /// Number of the round about to be played (1-based)
    pub fn current_round(&self) -> usize {
        self.history.len() + 1
    }

    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    pub fn set_record_id(&mut self, record_id: String) {
        self.record_id = Some(record_id);
    }

    /// Totals in roster order
    pub fn player_totals(&self) -> Vec<PlayerTotal> {
        self.roster
            .iter()
            .map(|name| PlayerTotal {
                name: name.clone(),
                total: self.totals.get(name).copied().unwrap_or_default(),
            })
            .collect()
    }

    /// Totals sorted descending; equal totals keep roster order
    pub fn ranking(&self) -> Vec<PlayerTotal> {
        rank_players(&self.roster, &self.totals)
    }
}

/// Sorts players by total descending. The sort is stable, so ties keep roster order.
pub fn rank_players(roster: &[String], totals: &BTreeMap<String, f64>) -> Vec<PlayerTotal> {
    let mut ranking: Vec<PlayerTotal> = roster
        .iter()
        .map(|name| PlayerTotal {
            name: name.clone(),
            total: totals.get(name).copied().unwrap_or_default(),
        })
        .collect();
    ranking.sort_by(|a, b| b.total.total_cmp(&a.total));
    ranking
}

/// `(name, score)` pairs as a JSON object, keeping pair order both ways
mod ordered_scores {
    use serde::de::{MapAccess, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(scores: &[(String, f64)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(scores.iter().map(|(name, value)| (name, value)))
    }

    struct ScoresVisitor;

    impl<'de> Visitor<'de> for ScoresVisitor {
        type Value = Vec<(String, f64)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of player scores")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut scores = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                scores.push(entry);
            }
            Ok(scores)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, f64)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ScoresVisitor)
    }
}
