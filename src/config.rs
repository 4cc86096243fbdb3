use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

const DEFAULT_PORT: u16 = 5002;
const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "123123";
const DEFAULT_GEO_LOOKUP_URL: &str = "https://ipinfo.io";

/// Runtime configuration, read from environment variables with defaults
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// When unset the server keeps sessions and game records in memory
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub session_expiration_days: i64,
    pub report_dir: PathBuf,
    pub admin_username: String,
    pub admin_password: String,
    /// `None` disables remote lookups; regions then fall back to local labels
    pub geo_lookup_url: Option<String>,
    pub geo_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            session_expiration_days: 1,
            report_dir: PathBuf::from("static"),
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            geo_lookup_url: Some(DEFAULT_GEO_LOOKUP_URL.to_string()),
            geo_timeout: Duration::from_secs(5),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = read("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let jwt_secret = read("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, using development secret");
            defaults.jwt_secret.clone()
        });

        let session_expiration_days = read("SESSION_EXPIRATION_DAYS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.session_expiration_days);

        let admin_username = read("ADMIN_USERNAME").unwrap_or(defaults.admin_username);
        let admin_password = read("ADMIN_PASSWORD").unwrap_or_else(|| {
            warn!("ADMIN_PASSWORD not set, using default admin password");
            defaults.admin_password.clone()
        });

        let geo_lookup_url = match read("GEO_LOOKUP_URL") {
            Some(url) if url.eq_ignore_ascii_case("off") => None,
            Some(url) => Some(url.trim_end_matches('/').to_string()),
            None => defaults.geo_lookup_url,
        };

        let geo_timeout = read("GEO_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.geo_timeout);

        Self {
            port,
            database_url: read("DATABASE_URL"),
            jwt_secret,
            session_expiration_days,
            report_dir: read("REPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.report_dir),
            admin_username,
            admin_password,
            geo_lookup_url,
            geo_timeout,
        }
    }
}
