// Library crate for the scorekeeper server
// This file exposes the public API for integration tests

pub mod admin;
pub mod config;
pub mod game;
pub mod geo;
pub mod report;
pub mod routes;
pub mod session;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use game::{GameManager, GamePhase, GameState, RoundResult, ScoringError};
pub use routes::app_router;
pub use shared::{AppError, AppState};
