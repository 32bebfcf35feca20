use axum::Router;
use axum::routing::{any, get, post};

use crate::interface_adapters::handlers;
use crate::interface_adapters::state::AppState;
use crate::net::client::ws_handler;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/scores/submit", post(handlers::submit_score))
        .route("/api/scores/games", get(handlers::list_games))
        .route("/api/scores/players", get(handlers::list_players))
        .route("/api/scores/game/{game_name}/top", get(handlers::top_scores))
        .route("/api/scores/game/{game_name}/stats", get(handlers::game_stats))
        .route(
            "/api/scores/game/{game_name}/player/{player_name}/high",
            get(handlers::player_high_score),
        )
        .route(
            "/api/scores/game/{game_name}/player/{player_name}",
            get(handlers::player_game_scores),
        )
        .route("/api/scores/game/{game_name}", get(handlers::game_scores))
        .route(
            "/api/scores/player/{player_name}/stats",
            get(handlers::player_stats),
        )
        .route("/api/scores/player/{player_name}", get(handlers::player_scores))
        .route("/api/scores/{id}", get(handlers::score_by_id))
        .route("/health", get(handlers::health))
        .route("/health/ready", get(handlers::health_ready))
        .route("/ws", any(ws_handler))
        .route("/ws/stats", get(handlers::feed_stats))
        .with_state(state)
}
