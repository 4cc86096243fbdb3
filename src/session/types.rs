use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Who a token was issued to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionRole {
    Player,
    Admin,
}

/// JWT claims structure containing session information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub session_id: String,
    pub username: String,
    pub role: SessionRole,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// Request payload for starting a session; both fields are optional for anonymous play
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Response structure for session creation endpoint
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionResponse {
    pub token: String,
    pub session_id: String,
    pub username: String,
    pub region: String,
}

/// Details of the caller's session
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInfoResponse {
    pub session_id: String,
    pub username: String,
    pub email: String,
    pub login_time: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub session_id: String,
    pub logout_time: DateTime<Utc>,
    pub duration_secs: i64,
}
