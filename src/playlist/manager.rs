use super::models::{Playlist, ProfilePlaylist, ProfileRow, ProfileSong};
use crate::errors::{is_foreign_key_violation, AppError};
use crate::songs::{self, NewSong};
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;

pub const DEFAULT_MOOD: &str = "General";

#[derive(Clone)]
pub struct PlaylistManager {
    pool: Pool<Sqlite>,
}

impl PlaylistManager {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Saves a playlist and links its songs, creating song rows for external
    /// ids the library has not seen yet. Either everything is stored or
    /// nothing is. Returns the new playlist id.
    pub async fn create_playlist(
        &self,
        user_id: i64,
        name: &str,
        mood: Option<&str>,
        tracks: &[NewSong],
    ) -> Result<i64, AppError> {
        let playlist_mood = mood.filter(|m| !m.trim().is_empty()).unwrap_or(DEFAULT_MOOD);

        let mut tx = self.pool.begin().await?;

        // The insert is the first statement so the transaction holds the
        // write lock from the start; the owner check rides on the foreign key.
        let playlist_id = sqlx::query("INSERT INTO playlists (user_id, name, mood) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(name)
            .bind(playlist_mood)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::NotFound("User not found".to_string())
                } else {
                    AppError::from(e)
                }
            })?
            .last_insert_rowid();

        for track in tracks {
            let song_id = songs::find_or_create(&mut tx, track, mood).await?;

            sqlx::query("INSERT INTO playlist_songs (playlist_id, song_id) VALUES (?, ?)")
                .bind(playlist_id)
                .bind(song_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        log::info!(
            "Saved playlist {} '{}' for user {} with {} songs",
            playlist_id,
            name,
            user_id,
            tracks.len()
        );
        Ok(playlist_id)
    }

    pub async fn remove_song(&self, playlist_id: i64, song_id: i64) -> Result<u64, AppError> {
        let removed = sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
            .bind(playlist_id)
            .bind(song_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(removed)
    }

    pub async fn delete_playlist(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM playlists WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Every playlist a user owns with its songs, newest playlist first.
    pub async fn profile_playlists(&self, user_id: i64) -> Result<Vec<ProfilePlaylist>, AppError> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT
                p.id as playlist_id, p.name as playlist_name, p.mood, p.created_at,
                s.id as song_id, s.title, s.artist, s.youtube_id
            FROM playlists p
            LEFT JOIN playlist_songs ps ON p.id = ps.playlist_id
            LEFT JOIN songs s ON ps.song_id = s.id
            WHERE p.user_id = ?
            ORDER BY p.created_at DESC, p.id DESC, ps.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(group_profile_rows(rows))
    }

    pub async fn list_all(&self) -> Result<Vec<Playlist>, AppError> {
        let playlists = sqlx::query_as::<_, Playlist>(
            "SELECT id, user_id, name, mood, created_at FROM playlists ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(playlists)
    }
}

/// Fold the flat join into one object per playlist. Playlists keep the order
/// in which they first appear, and so do the songs inside each one.
pub fn group_profile_rows(rows: Vec<ProfileRow>) -> Vec<ProfilePlaylist> {
    let mut playlists: Vec<ProfilePlaylist> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for row in rows {
        let slot = *index.entry(row.playlist_id).or_insert_with(|| {
            playlists.push(ProfilePlaylist {
                id: row.playlist_id,
                name: row.playlist_name.clone(),
                mood: row.mood.clone(),
                created_at: row.created_at.clone(),
                songs: Vec::new(),
            });
            playlists.len() - 1
        });

        if let Some(song_id) = row.song_id {
            playlists[slot].songs.push(ProfileSong {
                id: song_id,
                title: row.title.unwrap_or_default(),
                artist: row.artist.unwrap_or_default(),
                youtube_id: row.youtube_id.unwrap_or_default(),
            });
        }
    }

    playlists
}
