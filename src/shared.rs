use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::admin::{AdminCredentials, AdminService};
use crate::config::AppConfig;
use crate::game::{repository::GameRecordRepository, GameManager, GameService, ScoringError};
use crate::geo::GeoLocator;
use crate::report::{ReportService, ReportStore};
use crate::session::{
    generators::PetNameUsernameGenerator, repository::UserSessionRepository,
    service::SessionService, token::TokenConfig,
};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<SessionService>,
    pub game_service: Arc<GameService>,
    pub admin_service: Arc<AdminService>,
    pub report_store: Arc<ReportStore>,
}

impl AppState {
    /// Wires services on top of the given storage backends and geolocation resolver
    pub fn new(
        config: &AppConfig,
        session_repository: Arc<dyn UserSessionRepository + Send + Sync>,
        game_repository: Arc<dyn GameRecordRepository + Send + Sync>,
        geo_locator: Arc<dyn GeoLocator>,
    ) -> Self {
        let token_config = TokenConfig::new(
            config.jwt_secret.clone(),
            config.session_expiration_days,
        );
        let report_store = Arc::new(ReportStore::new(config.report_dir.clone()));

        let session_service = Arc::new(SessionService::new(
            Arc::clone(&session_repository),
            Arc::clone(&geo_locator),
            Arc::new(PetNameUsernameGenerator::new()),
            token_config.clone(),
        ));

        let game_service = Arc::new(GameService::new(
            Arc::new(GameManager::new()),
            Arc::clone(&game_repository),
            Arc::clone(&session_service),
            ReportService::new(Arc::clone(&report_store)),
        ));

        let admin_service = Arc::new(AdminService::new(
            AdminCredentials::new(
                config.admin_username.clone(),
                config.admin_password.clone(),
            ),
            token_config,
            game_repository,
            session_repository,
            geo_locator,
        ));

        Self {
            session_service,
            game_service,
            admin_service,
            report_store,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl From<ScoringError> for AppError {
    fn from(error: ScoringError) -> Self {
        match error {
            ScoringError::NotInProgress | ScoringError::AlreadyStarted => {
                AppError::Conflict(error.to_string())
            }
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::JwtError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
