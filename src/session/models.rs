use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the user_session table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserSessionModel {
    pub id: String, // UUID v4 as string
    pub username: String,
    pub email: String,
    pub login_time: DateTime<Utc>,
    pub logout_time: Option<DateTime<Utc>>,
    pub duration_secs: Option<i64>, // Derived from login/logout time
    pub user_agent: String,
    pub ip_address: Option<String>,
    pub region: Option<String>,
}

impl UserSessionModel {
    /// Creates a new session that logs in now
    pub fn new(
        username: String,
        email: String,
        user_agent: String,
        ip_address: String,
        region: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            login_time: Utc::now(),
            logout_time: None,
            duration_secs: None,
            user_agent,
            ip_address: Some(ip_address),
            region: Some(region),
        }
    }

    /// Stamps the logout time and derives the duration in whole seconds
    pub fn mark_logout(&mut self, at: DateTime<Utc>) {
        self.logout_time = Some(at);
        self.duration_secs = Some((at - self.login_time).num_seconds().max(0));
    }

    pub fn is_logged_out(&self) -> bool {
        self.logout_time.is_some()
    }
}
