pub mod admin;
pub mod auth;
mod extract;
pub mod playlists;
pub mod profile;
pub mod search;
pub mod upload;

use crate::uploads::PUBLIC_PREFIX;
use crate::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// The whole HTTP surface: the JSON API under `/api` and uploaded images
/// under `/uploads`.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let api = Router::new()
        // Auth
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        // Profile settings
        .route("/users/:id/update", put(profile::update_profile))
        .route("/users/:id/change-password", put(profile::change_password))
        .route("/users/:id/delete-account", delete(profile::delete_account))
        .route(
            "/users/:id/upload",
            post(upload::upload_profile_pic).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/profile/:user_id", get(profile::get_profile))
        // Search & mood
        .route("/search", get(search::search))
        .route("/mood/generate", get(search::generate_mood_playlist))
        // Playlists
        .route("/playlists/create", post(playlists::create_playlist))
        .route(
            "/playlists/:playlist_id/songs/:song_id",
            delete(playlists::remove_song),
        )
        .route("/playlists/:playlist_id", delete(playlists::delete_playlist))
        .nest("/admin", admin::router());

    let uploads = ServeDir::new(state.uploads.dir());

    Router::new()
        .nest("/api", api)
        .nest_service(PUBLIC_PREFIX, uploads)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
