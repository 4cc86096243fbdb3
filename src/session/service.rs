use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    generators::UsernameGenerator,
    models::UserSessionModel,
    origin::ClientOrigin,
    repository::UserSessionRepository,
    token::TokenConfig,
    types::{CreateSessionRequest, SessionClaims, SessionResponse, SessionRole},
};
use crate::{geo::GeoLocator, shared::AppError};

pub const ANONYMOUS_EMAIL: &str = "anonymous@example.com";

/// Service for handling session business logic
pub struct SessionService {
    repository: Arc<dyn UserSessionRepository + Send + Sync>,
    geo_locator: Arc<dyn GeoLocator>,
    username_generator: Arc<dyn UsernameGenerator>,
    token_config: TokenConfig,
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn UserSessionRepository + Send + Sync>,
        geo_locator: Arc<dyn GeoLocator>,
        username_generator: Arc<dyn UsernameGenerator>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            repository,
            geo_locator,
            username_generator,
            token_config,
        }
    }

    /// Records a new session for the caller and issues its bearer token.
    /// Missing names fall back to an anonymous guest identity.
    #[instrument(skip(self, request))]
    pub async fn create_session(
        &self,
        request: CreateSessionRequest,
        origin: &ClientOrigin,
    ) -> Result<SessionResponse, AppError> {
        let username = match non_blank(request.username) {
            Some(name) => name,
            None => self.username_generator.generate().await,
        };
        let email = non_blank(request.email).unwrap_or_else(|| ANONYMOUS_EMAIL.to_string());

        let region = self.geo_locator.locate(&origin.ip).await;

        info!(
            username = %username,
            email = %email,
            ip = %origin.ip,
            region = %region,
            user_agent = %origin.user_agent,
            "Creating user session"
        );

        let session = UserSessionModel::new(
            username,
            email,
            origin.user_agent.clone(),
            origin.ip.clone(),
            region.clone(),
        );
        self.repository.create_session(&session).await?;

        let token =
            self.token_config
                .create_token(&session.id, &session.username, SessionRole::Player)?;

        info!(session_id = %session.id, username = %session.username, "User session created");

        Ok(SessionResponse {
            token,
            session_id: session.id,
            username: session.username,
            region,
        })
    }

    /// Validates a player token and checks the session is still open
    #[instrument(skip(self, token))]
    pub async fn validate_session(&self, token: &str) -> Result<SessionClaims, AppError> {
        let claims = self.token_config.validate_token(token)?;

        if claims.role != SessionRole::Player {
            warn!(session_id = %claims.session_id, role = %claims.role, "Token is not a player token");
            return Err(AppError::Unauthorized("Player session required".to_string()));
        }

        match self.repository.get_session(&claims.session_id).await? {
            Some(session) if session.is_logged_out() => {
                warn!(session_id = %claims.session_id, "Token used after logout");
                Err(AppError::Unauthorized("Session has ended".to_string()))
            }
            Some(_) => Ok(claims),
            None => {
                warn!(
                    session_id = %claims.session_id,
                    "Session not found in database"
                );
                Err(AppError::Unauthorized("Session not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get_session(&self, session_id: &str) -> Result<UserSessionModel, AppError> {
        self.repository
            .get_session(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
    }

    /// Stamps logout time and duration on the session
    #[instrument(skip(self))]
    pub async fn end_session(&self, session_id: &str) -> Result<UserSessionModel, AppError> {
        let mut session = self.get_session(session_id).await?;

        session.mark_logout(Utc::now());
        self.repository.update_session(&session).await?;

        info!(
            session_id = %session.id,
            username = %session.username,
            duration_secs = session.duration_secs.unwrap_or_default(),
            "User session ended"
        );
        Ok(session)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
