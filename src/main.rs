use scorekeeper::{
    app_router,
    game::repository::{
        GameRecordRepository, InMemoryGameRecordRepository, PostgresGameRecordRepository,
    },
    geo::{GeoLocator, IpInfoLocator, StaticGeoLocator},
    session::repository::{
        InMemoryUserSessionRepository, PostgresUserSessionRepository, UserSessionRepository,
    },
    AppConfig, AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type SessionStore = Arc<dyn UserSessionRepository + Send + Sync>;
type RecordStore = Arc<dyn GameRecordRepository + Send + Sync>;

async fn repositories(
    config: &AppConfig,
) -> Result<(SessionStore, RecordStore), Box<dyn std::error::Error>> {
    match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Using PostgreSQL storage");
            Ok((
                Arc::new(PostgresUserSessionRepository::new(pool.clone())),
                Arc::new(PostgresGameRecordRepository::new(pool)),
            ))
        }
        None => {
            warn!("DATABASE_URL not set, sessions and game records are kept in memory");
            Ok((
                Arc::new(InMemoryUserSessionRepository::new()),
                Arc::new(InMemoryGameRecordRepository::new()),
            ))
        }
    }
}

fn geo_locator(config: &AppConfig) -> Arc<dyn GeoLocator> {
    let Some(url) = &config.geo_lookup_url else {
        info!("Remote geolocation disabled");
        return Arc::new(StaticGeoLocator::new());
    };

    match IpInfoLocator::new(url, config.geo_timeout) {
        Ok(locator) => Arc::new(locator),
        Err(e) => {
            warn!(error = %e, "Failed to build geolocation client, using local labels only");
            Arc::new(StaticGeoLocator::new())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scorekeeper=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting scorekeeper server");

    let config = AppConfig::from_env();
    let (session_repository, game_repository) = repositories(&config).await?;
    let app_state = AppState::new(
        &config,
        session_repository,
        game_repository,
        geo_locator(&config),
    );

    let app = app_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running on http://localhost:{}", config.port);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
