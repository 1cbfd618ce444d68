//! Admin panel endpoints, mounted under `/api/admin`.

use crate::activity::{ActivityEntry, DEFAULT_FEED_LIMIT};
use crate::admin::DashboardStats;
use crate::errors::{AppError, ResultExt};
use crate::playlist::Playlist;
use crate::songs::NewSong;
use crate::users::UserSummary;
use crate::AppState;
use super::extract::{JsonBody, PathParam, QueryParams};
use axum::extract::State;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

/// Clients send the flag either as a JSON boolean or as 0/1.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum AdminFlag {
    Bool(bool),
    Number(i64),
}

impl From<AdminFlag> for bool {
    fn from(flag: AdminFlag) -> Self {
        match flag {
            AdminFlag::Bool(b) => b,
            AdminFlag::Number(n) => n != 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToggleAdminRequest {
    pub is_admin: AdminFlag,
}

#[derive(Debug, Deserialize)]
pub struct AddSongRequest {
    pub youtube_id: String,
    pub title: String,
    pub artist: String,
    pub mood: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/activity", get(activity))
        .route("/users", get(list_users))
        .route("/users/:id/toggle-admin", put(toggle_admin))
        .route("/users/:id", delete(delete_user))
        .route("/playlists", get(list_playlists))
        .route("/songs", post(add_song))
        .route("/songs/:id", delete(delete_song))
}

/// GET /api/admin/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, AppError> {
    let stats = state.admin.stats().await.or_internal("Stats failed")?;
    Ok(Json(stats))
}

/// GET /api/admin/activity?limit=
pub async fn activity(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ActivityQuery>,
) -> Result<Json<Vec<ActivityEntry>>, AppError> {
    let entries = state
        .activity
        .recent(query.limit.unwrap_or(DEFAULT_FEED_LIMIT))
        .await
        .or_internal("Logs failed")?;

    Ok(Json(entries))
}

/// GET /api/admin/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>, AppError> {
    let users = state.users.list_users().await.or_internal("Users failed")?;
    Ok(Json(users))
}

/// PUT /api/admin/users/:id/toggle-admin
pub async fn toggle_admin(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<ToggleAdminRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .users
        .set_admin(id, body.is_admin.into())
        .await
        .or_internal("Toggle admin failed")?;

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/admin/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Value>, AppError> {
    state.users.force_delete(id).await.or_internal("Delete failed")?;
    Ok(Json(json!({ "message": "User deleted" })))
}

/// GET /api/admin/playlists
pub async fn list_playlists(State(state): State<AppState>) -> Result<Json<Vec<Playlist>>, AppError> {
    let playlists = state.playlists.list_all().await.or_internal("Playlists failed")?;
    Ok(Json(playlists))
}

/// POST /api/admin/songs
pub async fn add_song(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<AddSongRequest>,
) -> Result<Json<Value>, AppError> {
    let song = NewSong {
        title: body.title,
        artist: body.artist,
        youtube_id: body.youtube_id,
    };
    state
        .songs
        .add_song(&song, body.mood.as_deref())
        .await
        .or_internal("Add song failed")?;

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/admin/songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Value>, AppError> {
    state.songs.delete_song(id).await.or_internal("Delete failed")?;
    Ok(Json(json!({ "success": true })))
}
