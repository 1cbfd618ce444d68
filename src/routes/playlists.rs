use crate::activity::ActionType;
use crate::errors::{AppError, ResultExt};
use crate::songs::NewSong;
use crate::AppState;
use super::extract::{JsonBody, PathParam};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistRequest {
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub songs: Vec<NewSong>,
    pub mood: Option<String>,
}

/// Optional body on playlist deletes naming who acted, for the activity log.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorBody {
    pub user_id: Option<i64>,
}

/// POST /api/playlists/create
pub async fn create_playlist(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreatePlaylistRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let playlist_id = state
        .playlists
        .create_playlist(body.user_id, &body.name, body.mood.as_deref(), &body.songs)
        .await
        .or_internal("Save failed")?;

    state
        .activity
        .log(
            Some(body.user_id),
            ActionType::PlaylistCreated,
            &format!("saved a new mix: {}", body.name),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "playlistId": playlist_id })),
    ))
}

/// DELETE /api/playlists/:playlist_id/songs/:song_id
pub async fn remove_song(
    State(state): State<AppState>,
    PathParam((playlist_id, song_id)): PathParam<(i64, i64)>,
    body: Option<Json<ActorBody>>,
) -> Result<Json<Value>, AppError> {
    state
        .playlists
        .remove_song(playlist_id, song_id)
        .await
        .or_internal("Failed to remove song")?;

    if let Some(user_id) = body.and_then(|Json(b)| b.user_id) {
        state
            .activity
            .log(Some(user_id), ActionType::SongRemoved, "removed a song")
            .await;
    }

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/playlists/:playlist_id
pub async fn delete_playlist(
    State(state): State<AppState>,
    PathParam(playlist_id): PathParam<i64>,
    body: Option<Json<ActorBody>>,
) -> Result<Json<Value>, AppError> {
    state
        .playlists
        .delete_playlist(playlist_id)
        .await
        .or_internal("Failed to delete playlist")?;

    if let Some(user_id) = body.and_then(|Json(b)| b.user_id) {
        state
            .activity
            .log(Some(user_id), ActionType::PlaylistDeleted, "deleted a playlist")
            .await;
    }

    Ok(Json(json!({ "success": true })))
}
