//! Route Definitions

use super::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/games", post(create_game_handler))
        .route("/api/games/:id", get(get_game_handler))
        .route("/api/games/:id/bets", post(place_bet_handler))
        .route("/api/games/:id/end", post(end_game_handler))
        .route("/api/games/:id/verify", get(verify_game_handler))
        .route("/api/stats", get(stats_handler))
        .with_state(state)
}
