use crate::errors::{AppError, ResultExt};
use crate::songs::Song;
use crate::AppState;
use super::extract::QueryParams;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

pub const NO_SONGS_FOR_MOOD: &str = "No songs found for this mood.";

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoodQuery {
    pub mood: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SongsResponse {
    pub songs: Vec<Song>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /api/search?q=
pub async fn search(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<SongsResponse>, AppError> {
    let songs = state
        .songs
        .search(query.q.as_deref().unwrap_or_default())
        .await
        .or_internal("Search failed")?;

    Ok(Json(SongsResponse { songs, message: None }))
}

/// GET /api/mood/generate?mood=
pub async fn generate_mood_playlist(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<MoodQuery>,
) -> Result<Json<SongsResponse>, AppError> {
    let songs = state
        .songs
        .generate_for_mood(query.mood.as_deref().unwrap_or_default())
        .await
        .or_internal("Failed to generate mood playlist")?;

    let message = songs.is_empty().then(|| NO_SONGS_FOR_MOOD.to_string());
    Ok(Json(SongsResponse { songs, message }))
}
