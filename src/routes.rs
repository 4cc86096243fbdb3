use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::shared::AppState;
use crate::{admin, game, report, session};

/// Builds the full HTTP surface.
/// Player routes need a session token, admin routes an admin token.
pub fn app_router(state: AppState) -> Router {
    let player_routes = Router::new()
        .route("/session", get(session::session_info))
        .route("/logout", post(session::logout))
        .route("/game", get(game::current_game))
        .route("/game/setup", post(game::setup_game))
        .route("/game/rounds", post(game::play_round))
        .route("/game/end", post(game::end_game))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::jwt_auth,
        ));

    let admin_routes = Router::new()
        .route("/admin/stats", get(admin::admin_stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::admin_auth,
        ));

    Router::new()
        .route("/session", post(session::create_session))
        .route("/reports/:filename", get(report::download_report))
        .route("/admin/login", post(admin::admin_login))
        .merge(player_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
