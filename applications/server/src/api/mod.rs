/// API route modules
pub mod contributors;
pub mod health;
pub mod playlists;
pub mod songs;
pub mod stats;
pub mod users;
pub mod ws;

use crate::{middleware, state::AppState};
use axum::{
    middleware as axum_middleware,
    routing::{delete, get, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the full `/api` router
pub fn create_router(app_state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/stats", get(stats::stats))
        .route("/playlists/public", get(playlists::public_playlists))
        .route("/ws", get(ws::ws_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        // Users
        .route("/me", get(users::me))
        .route("/users", get(users::list_users))
        .route("/users/:id", get(users::get_user))
        // Songs
        .route("/songs", get(songs::list_songs).post(songs::create_song))
        .route("/songs/:id", get(songs::get_song))
        // Playlists
        .route(
            "/playlists",
            get(playlists::list_playlists).post(playlists::create_playlist),
        )
        .route("/playlists/mine", get(playlists::my_playlists))
        .route(
            "/playlists/:id",
            get(playlists::get_playlist)
                .patch(playlists::update_playlist)
                .delete(playlists::delete_playlist),
        )
        .route(
            "/playlists/:id/songs",
            get(playlists::list_playlist_songs).post(playlists::add_song_to_playlist),
        )
        .route(
            "/playlists/:id/songs/order",
            put(playlists::reorder_playlist_songs),
        )
        .route(
            "/playlists/:id/songs/:song_id",
            delete(playlists::remove_song_from_playlist),
        )
        // Contributors
        .route(
            "/playlists/:id/contributors",
            get(contributors::list_contributors).post(contributors::add_contributor),
        )
        .route(
            "/playlists/:id/contributors/:user_id",
            put(contributors::update_contributor_role)
                .delete(contributors::remove_contributor),
        )
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&app_state.auth_service),
            middleware::auth_middleware,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
