pub mod models;

use crate::errors::{is_unique_violation, AppError};
pub use models::{NewSong, Song};
use sqlx::{Pool, Row, Sqlite, SqliteConnection};

/// Upper bound on a generated mood playlist.
pub const MOOD_PLAYLIST_SIZE: i64 = 15;

#[derive(Clone)]
pub struct SongManager {
    pool: Pool<Sqlite>,
}

impl SongManager {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Substring match on title or artist. SQLite's LIKE folds ASCII case.
    pub async fn search(&self, query: &str) -> Result<Vec<Song>, AppError> {
        let pattern = format!("%{}%", query);

        let songs = sqlx::query_as::<_, Song>(
            "SELECT id, title, artist, mood, youtube_id FROM songs WHERE title LIKE ? OR artist LIKE ?",
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(songs)
    }

    pub async fn generate_for_mood(&self, mood: &str) -> Result<Vec<Song>, AppError> {
        let songs = sqlx::query_as::<_, Song>(
            "SELECT id, title, artist, mood, youtube_id FROM songs WHERE mood = ? ORDER BY RANDOM() LIMIT ?",
        )
        .bind(mood)
        .bind(MOOD_PLAYLIST_SIZE)
        .fetch_all(&self.pool)
        .await?;

        log::debug!("Generated {} songs for mood '{}'", songs.len(), mood);
        Ok(songs)
    }

    pub async fn add_song(
        &self,
        song: &NewSong,
        mood: Option<&str>,
    ) -> Result<i64, AppError> {
        let mut conn = self.pool.acquire().await?;
        insert_song(&mut conn, song, mood).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Song already exists.".to_string())
            } else {
                e.into()
            }
        })
    }

    /// Unlinks the song from every playlist, then removes it.
    pub async fn delete_song(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let unlinked = sqlx::query("DELETE FROM playlist_songs WHERE song_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        log::info!("Deleted song {} (unlinked from {} playlists)", id, unlinked);
        Ok(())
    }
}

/// Reuse the row with the same external id, or insert the song.
pub async fn find_or_create(
    conn: &mut SqliteConnection,
    song: &NewSong,
    mood: Option<&str>,
) -> Result<i64, AppError> {
    let existing = sqlx::query("SELECT id FROM songs WHERE youtube_id = ?")
        .bind(&song.youtube_id)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(row) = existing {
        return Ok(row.try_get("id")?);
    }

    Ok(insert_song(conn, song, mood).await?)
}

async fn insert_song(
    conn: &mut SqliteConnection,
    song: &NewSong,
    mood: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO songs (title, artist, youtube_id, mood) VALUES (?, ?, ?, ?)")
        .bind(&song.title)
        .bind(&song.artist)
        .bind(&song.youtube_id)
        .bind(mood)
        .execute(&mut *conn)
        .await?;

    Ok(result.last_insert_rowid())
}
