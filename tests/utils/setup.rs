use axum::Router;
use std::sync::Arc;
use tempfile::TempDir;

use scorekeeper::{
    app_router,
    game::repository::InMemoryGameRecordRepository,
    geo::StaticGeoLocator,
    session::repository::InMemoryUserSessionRepository,
    AppConfig, AppState,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestApp {
    pub router: Router,
    pub game_repository: Arc<InMemoryGameRecordRepository>,
    pub session_repository: Arc<InMemoryUserSessionRepository>,
    pub _report_dir: TempDir,
}

pub struct TestAppBuilder {
    config: AppConfig,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        let config = AppConfig {
            jwt_secret: "integration-secret".to_string(),
            geo_lookup_url: None,
            ..AppConfig::default()
        };
        Self { config }
    }

    pub fn with_admin(mut self, username: &str, password: &str) -> Self {
        self.config.admin_username = username.to_string();
        self.config.admin_password = password.to_string();
        self
    }

    pub fn build(mut self) -> TestApp {
        let report_dir = tempfile::tempdir().unwrap();
        self.config.report_dir = report_dir.path().join("static");

        let game_repository = Arc::new(InMemoryGameRecordRepository::new());
        let session_repository = Arc::new(InMemoryUserSessionRepository::new());

        let state = AppState::new(
            &self.config,
            session_repository.clone(),
            game_repository.clone(),
            Arc::new(StaticGeoLocator::new()),
        );

        TestApp {
            router: app_router(state),
            game_repository,
            session_repository,
            _report_dir: report_dir,
        }
    }
}
