use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument, warn};

use super::models::UserSessionModel;
use crate::shared::AppError;

/// Trait for user session repository operations.
/// Sessions are never deleted by the application.
#[async_trait]
pub trait UserSessionRepository {
    async fn create_session(&self, session: &UserSessionModel) -> Result<(), AppError>;
    async fn get_session(&self, session_id: &str) -> Result<Option<UserSessionModel>, AppError>;
    async fn update_session(&self, session: &UserSessionModel) -> Result<(), AppError>;
}

/// In-memory implementation of UserSessionRepository for development and testing
///
/// Data is stored in memory and will be lost when the application restarts.
pub struct InMemoryUserSessionRepository {
    sessions: Mutex<HashMap<String, UserSessionModel>>,
}

impl Default for InMemoryUserSessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserSessionRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated sessions
    pub fn with_sessions(sessions: Vec<UserSessionModel>) -> Self {
        let session_map = sessions
            .into_iter()
            .map(|session| (session.id.clone(), session))
            .collect();

        Self {
            sessions: Mutex::new(session_map),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, UserSessionModel>>, AppError> {
        self.sessions.lock().map_err(|_| AppError::Internal)
    }

    /// Returns the current number of sessions in the repository
    pub fn session_count(&self) -> usize {
        self.lock().map(|sessions| sessions.len()).unwrap_or(0)
    }
}

#[async_trait]
impl UserSessionRepository for InMemoryUserSessionRepository {
    #[instrument(skip(self, session))]
    async fn create_session(&self, session: &UserSessionModel) -> Result<(), AppError> {
        debug!(session_id = %session.id, username = %session.username, "Creating session in memory");

        let mut sessions = self.lock()?;
        if sessions.contains_key(&session.id) {
            warn!(session_id = %session.id, "Session already exists in memory");
            return Err(AppError::DatabaseError(
                "Session already exists".to_string(),
            ));
        }
        sessions.insert(session.id.clone(), session.clone());

        debug!(session_id = %session.id, "Session created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_session(&self, session_id: &str) -> Result<Option<UserSessionModel>, AppError> {
        debug!(session_id = %session_id, "Fetching session from memory");

        let sessions = self.lock()?;
        let session = sessions.get(session_id).cloned();

        match &session {
            Some(s) => {
                debug!(session_id = %session_id, username = %s.username, "Session found in memory")
            }
            None => debug!(session_id = %session_id, "Session not found in memory"),
        }

        Ok(session)
    }

    #[instrument(skip(self, session))]
    async fn update_session(&self, session: &UserSessionModel) -> Result<(), AppError> {
        debug!(session_id = %session.id, "Updating session in memory");

        let mut sessions = self.lock()?;
        if !sessions.contains_key(&session.id) {
            warn!(session_id = %session.id, "Session not found for update in memory");
            return Err(AppError::NotFound("Session not found".to_string()));
        }
        sessions.insert(session.id.clone(), session.clone());

        debug!(session_id = %session.id, "Session updated successfully in memory");
        Ok(())
    }
}

/// PostgreSQL implementation of user session repository
pub struct PostgresUserSessionRepository {
    pool: PgPool,
}

impl PostgresUserSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserSessionRepository for PostgresUserSessionRepository {
    #[instrument(skip(self, session))]
    async fn create_session(&self, session: &UserSessionModel) -> Result<(), AppError> {
        debug!(session_id = %session.id, username = %session.username, "Creating session in database");

        sqlx::query(
            "INSERT INTO user_session (id, username, email, login_time, logout_time, duration_secs, user_agent, ip_address, region) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        )
        .bind(&session.id)
        .bind(&session.username)
        .bind(&session.email)
        .bind(session.login_time)
        .bind(session.logout_time)
        .bind(session.duration_secs)
        .bind(&session.user_agent)
        .bind(&session.ip_address)
        .bind(&session.region)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create session in database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(session_id = %session.id, "Session created successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_session(&self, session_id: &str) -> Result<Option<UserSessionModel>, AppError> {
        debug!(session_id = %session_id, "Fetching session from database");

        let row = sqlx::query(
            "SELECT id, username, email, login_time, logout_time, duration_secs, user_agent, ip_address, region FROM user_session WHERE id = $1"
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, session_id = %session_id, "Failed to fetch session from database");
            AppError::DatabaseError(e.to_string())
        })?;

        let session = row.map(|row| UserSessionModel {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            login_time: row.get("login_time"),
            logout_time: row.get("logout_time"),
            duration_secs: row.get("duration_secs"),
            user_agent: row.get("user_agent"),
            ip_address: row.get("ip_address"),
            region: row.get("region"),
        });

        match &session {
            Some(s) => {
                debug!(session_id = %session_id, username = %s.username, "Session found in database")
            }
            None => debug!(session_id = %session_id, "Session not found in database"),
        }

        Ok(session)
    }

    #[instrument(skip(self, session))]
    async fn update_session(&self, session: &UserSessionModel) -> Result<(), AppError> {
        debug!(session_id = %session.id, "Updating session in database");

        let result = sqlx::query(
            "UPDATE user_session SET logout_time = $2, duration_secs = $3, region = $4 WHERE id = $1",
        )
        .bind(&session.id)
        .bind(session.logout_time)
        .bind(session.duration_secs)
        .bind(&session.region)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, session_id = %session.id, "Failed to update session in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(session_id = %session.id, "Session not found for update");
            return Err(AppError::NotFound("Session not found".to_string()));
        }

        debug!(session_id = %session.id, "Session updated successfully in database");
        Ok(())
    }
}
