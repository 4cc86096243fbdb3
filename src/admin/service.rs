use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::types::{AdminStatsResponse, GameSummary};
use crate::game::repository::GameRecordRepository;
use crate::geo::GeoLocator;
use crate::session::{
    origin::ClientOrigin, repository::UserSessionRepository, token::TokenConfig, SessionClaims,
    SessionRole,
};
use crate::shared::AppError;

pub const UNKNOWN_USERNAME: &str = "Unknown";

/// Configured admin login
#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl AdminCredentials {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// Admin login and the read-only statistics view over stored games
pub struct AdminService {
    credentials: AdminCredentials,
    token_config: TokenConfig,
    game_repository: Arc<dyn GameRecordRepository + Send + Sync>,
    session_repository: Arc<dyn UserSessionRepository + Send + Sync>,
    geo_locator: Arc<dyn GeoLocator>,
}

impl AdminService {
    pub fn new(
        credentials: AdminCredentials,
        token_config: TokenConfig,
        game_repository: Arc<dyn GameRecordRepository + Send + Sync>,
        session_repository: Arc<dyn UserSessionRepository + Send + Sync>,
        geo_locator: Arc<dyn GeoLocator>,
    ) -> Self {
        Self {
            credentials,
            token_config,
            game_repository,
            session_repository,
            geo_locator,
        }
    }

    /// Checks the credentials and issues an admin token
    #[instrument(skip(self, password, origin))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        origin: &ClientOrigin,
    ) -> Result<String, AppError> {
        let region = self.geo_locator.locate(&origin.ip).await;

        if !self.credentials.matches(username, password) {
            warn!(
                username = %username,
                ip = %origin.ip,
                region = %region,
                "Admin login failed"
            );
            return Err(AppError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }

        info!(ip = %origin.ip, region = %region, "Admin login succeeded");
        self.token_config
            .create_token(&Uuid::new_v4().to_string(), username, SessionRole::Admin)
    }

    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, AppError> {
        self.token_config.validate_token(token)
    }

    /// Aggregates every stored game, finished or not
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<AdminStatsResponse, AppError> {
        let records = self.game_repository.list_records().await?;

        let mut games = Vec::with_capacity(records.len());
        for record in records {
            let username = self
                .session_repository
                .get_session(&record.user_session_id)
                .await?
                .map(|session| session.username)
                .unwrap_or_else(|| UNKNOWN_USERNAME.to_string());
            let (top_scorer, top_score) = record.top_scorer();

            games.push(GameSummary {
                round_count: record.round_count(),
                id: record.id,
                username,
                game_start_time: record.game_start_time,
                game_end_time: record.game_end_time,
                player_count: record.player_count,
                top_scorer,
                top_score,
            });
        }

        let total_rounds = games.iter().map(|game| game.round_count).sum();
        info!(total_games = games.len(), total_rounds, "Admin stats collected");

        Ok(AdminStatsResponse {
            total_games: games.len(),
            total_rounds,
            games,
        })
    }
}
