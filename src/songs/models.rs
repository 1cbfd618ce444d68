use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub mood: Option<String>,
    pub youtube_id: String,
}

/// A song as a client describes it, before it has a row of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub youtube_id: String,
}
