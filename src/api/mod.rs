// API layer module (HTTP adapter over the roster domain)

pub mod errors;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{players, teams, transfers};
use crate::domain::repositories::RosterStore;

/// The store handle shared across request handlers.
pub type SharedStore = Arc<dyn RosterStore>;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Builds the application router over any store implementation
///
/// Used by `main` with the PostgreSQL store and by the integration tests
/// with the in-memory one.
pub fn router(store: SharedStore) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Team routes
        .route("/api/teams", get(teams::list_teams))
        .route("/api/teams", post(teams::create_team))
        .route("/api/teams/:id", get(teams::get_team))
        .route("/api/teams/:id", patch(teams::update_team))
        .route("/api/teams/:id", delete(teams::delete_team))
        // Player routes
        .route("/api/players", get(players::list_players))
        .route("/api/players", post(players::create_player))
        .route("/api/players/:id", get(players::get_player))
        .route("/api/players/:id", patch(players::update_player))
        .route("/api/players/:id", delete(players::delete_player))
        // Transfer route
        .route(
            "/api/players/:player_id/transfer/:team_id",
            post(transfers::transfer_player),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(store)
}
