use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Playlist {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub mood: String,
    pub created_at: String, // "YYYY-MM-DD HH:MM:SS", UTC
}

/// One row of the profile outer join: a (playlist, song) pair, with the song
/// columns null for a playlist that has no songs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub playlist_id: i64,
    pub playlist_name: String,
    pub mood: String,
    pub created_at: String,
    pub song_id: Option<i64>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub youtube_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSong {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub youtube_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePlaylist {
    pub id: i64,
    pub name: String,
    pub mood: String,
    pub created_at: String,
    pub songs: Vec<ProfileSong>,
}
