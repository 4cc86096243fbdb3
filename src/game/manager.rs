use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::logic::GameState;

/// Holds the live game of each session, keyed by session ID
pub struct GameManager {
    games: Arc<RwLock<HashMap<String, GameState>>>,
}

impl Default for GameManager {
    fn default() -> Self {
        Self::new()
    }
}

impl GameManager {
    pub fn new() -> Self {
        Self {
            games: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Stores the session's game, replacing any previous one
    pub async fn insert_game(&self, session_id: &str, game: GameState) -> Option<GameState> {
        let mut games = self.games.write().await;
        games.insert(session_id.to_string(), game)
    }

    pub async fn get_game(&self, session_id: &str) -> Option<GameState> {
        let games = self.games.read().await;
        games.get(session_id).cloned()
    }

    /// Runs `f` against the session's game under the write lock
    pub async fn update_game<F, R>(&self, session_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut GameState) -> R,
    {
        let mut games = self.games.write().await;
        games.get_mut(session_id).map(f)
    }

    pub async fn remove_game(&self, session_id: &str) -> Option<GameState> {
        let mut games = self.games.write().await;
        games.remove(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::logic::GamePhase;
    use std::collections::HashMap;

    fn started(names: &[&str]) -> GameState {
        let mut game = GameState::new();
        let roster: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        game.start(&roster).unwrap();
        game
    }

    #[tokio::test]
    async fn test_games_are_isolated_per_session() {
        let manager = GameManager::new();
        manager.insert_game("session-a", started(&["Alice", "Bob"])).await;
        manager.insert_game("session-b", started(&["Carol", "Dan"])).await;

        let scores: HashMap<String, f64> = [("Bob".to_string(), -2.0)].into();
        let settled = manager
            .update_game("session-a", |game| game.record_round("Alice", &scores))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(settled.score("Alice"), Some(2.0));

        let a = manager.get_game("session-a").await.unwrap();
        let b = manager.get_game("session-b").await.unwrap();
        assert_eq!(a.history().len(), 1);
        assert!(b.history().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_session_returns_none() {
        let manager = GameManager::new();
        let result = manager
            .update_game("nope", |game| game.finish().is_ok())
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_insert_replaces_and_remove_discards() {
        let manager = GameManager::new();
        manager.insert_game("s", started(&["Alice"])).await;
        let previous = manager.insert_game("s", started(&["Bob"])).await;
        assert_eq!(previous.unwrap().roster(), &["Alice".to_string()]);

        let removed = manager.remove_game("s").await.unwrap();
        assert_eq!(removed.phase(), GamePhase::InProgress);
        assert!(manager.get_game("s").await.is_none());
    }
}
