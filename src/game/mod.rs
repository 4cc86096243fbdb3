// Public API
pub use handlers::{current_game, end_game, play_round, setup_game};
pub use logic::{
    rank_players, settle_round, GamePhase, GameState, PlayerTotal, RoundResult, ScoringError,
};
pub use manager::GameManager;
pub use service::GameService;

// Internal modules
mod handlers;
pub mod logic;
pub mod manager;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
