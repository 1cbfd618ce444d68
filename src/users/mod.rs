pub mod models;

use crate::activity::{self, ActionType};
use crate::credentials;
use crate::errors::{is_unique_violation, AppError};
pub use models::{UserSession, UserSummary};
use sqlx::{Pool, Row, Sqlite, SqliteConnection};

pub const USERNAME_TAKEN: &str = "Username already taken.";
pub const EMAIL_TAKEN: &str = "Email already exists.";

#[derive(Clone)]
pub struct UserManager {
    pool: Pool<Sqlite>,
}

impl UserManager {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserSession, AppError> {
        let row = sqlx::query(
            "SELECT id, username, profile_pic, is_admin, password_hash FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());
        let row = row.ok_or_else(invalid)?;

        let stored: String = row.try_get("password_hash")?;
        if !credentials::verify(&stored, password).await? {
            return Err(invalid());
        }

        Ok(UserSession {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            profile_pic: row.try_get("profile_pic")?,
            is_admin: row.try_get("is_admin")?,
        })
    }

    /// Returns the new user's id.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<i64, AppError> {
        let taken = sqlx::query("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict(USERNAME_TAKEN.to_string()));
        }

        let password_hash = credentials::hash(password).await?;

        let result = sqlx::query("INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)")
            .bind(username)
            .bind(email)
            .bind(&password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_or_store(e, EMAIL_TAKEN))?;

        log::info!("Registered user {} (@{})", result.last_insert_rowid(), username);
        Ok(result.last_insert_rowid())
    }

    pub async fn find(&self, id: i64) -> Result<Option<UserSession>, AppError> {
        let user = sqlx::query_as::<_, UserSession>(
            "SELECT id, username, profile_pic, is_admin FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn exists(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.find(id).await?.is_some())
    }

    pub async fn update_profile(
        &self,
        id: i64,
        username: &str,
        profile_pic: Option<&str>,
    ) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET username = ?, profile_pic = ? WHERE id = ?")
            .bind(username)
            .bind(profile_pic)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_or_store(e, USERNAME_TAKEN))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }

    pub async fn set_profile_pic(&self, id: i64, path: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET profile_pic = ? WHERE id = ?")
            .bind(path)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }

    pub async fn change_password(
        &self,
        id: i64,
        current: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let (_, stored) = self.credentials_of(id).await?;
        if !credentials::verify(&stored, current).await? {
            return Err(AppError::Unauthorized("Current password incorrect".to_string()));
        }

        let password_hash = credentials::hash(new_password).await?;
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(&password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Self-service deletion. The password must match before anything is
    /// removed. Returns the deleted username.
    pub async fn delete_account(&self, id: i64, password: &str) -> Result<String, AppError> {
        let (username, stored) = self.credentials_of(id).await?;
        if !credentials::verify(&stored, password).await? {
            return Err(AppError::Unauthorized("Incorrect password".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        cascade_delete(&mut tx, id, ActionType::AccountDeleted, |name| {
            format!("User @{} has permanently deleted their account.", name)
        })
        .await?;
        tx.commit().await?;

        log::info!("User {} (@{}) deleted their account", id, username);
        Ok(username)
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>, AppError> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT id, username, email, is_admin FROM users ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn set_admin(&self, id: i64, is_admin: bool) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET is_admin = ? WHERE id = ?")
            .bind(is_admin)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }

    /// Admin deletion. Runs the same cascade without a password check; a
    /// missing user is logged as `Unknown` and the call still succeeds.
    pub async fn force_delete(&self, id: i64) -> Result<String, AppError> {
        let mut tx = self.pool.begin().await?;
        let name = cascade_delete(&mut tx, id, ActionType::AdminAction, |name| {
            format!("Admin deleted user: @{}", name)
        })
        .await?;
        tx.commit().await?;

        log::info!("Admin deleted user {} (@{})", id, name);
        Ok(name)
    }

    async fn credentials_of(&self, id: i64) -> Result<(String, String), AppError> {
        let row = sqlx::query("SELECT username, password_hash FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(user_not_found)?;

        Ok((row.try_get("username")?, row.try_get("password_hash")?))
    }
}

/// Removes a user and everything that depends on it, children first:
/// playlist links, playlists, a tombstone entry naming the user, the user's
/// own log entries, then the user row. Returns the name written to the
/// tombstone, `Unknown` when the row was already gone.
///
/// The first statement is a write, so the caller's transaction takes the
/// write lock before it reads anything.
async fn cascade_delete<F>(
    conn: &mut SqliteConnection,
    user_id: i64,
    tombstone: ActionType,
    details: F,
) -> Result<String, AppError>
where
    F: FnOnce(&str) -> String,
{
    sqlx::query(
        "DELETE FROM playlist_songs WHERE playlist_id IN (SELECT id FROM playlists WHERE user_id = ?)",
    )
    .bind(user_id)
    .execute(&mut *conn)
    .await?;

    let name: String = match sqlx::query("SELECT username FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
    {
        Some(row) => row.try_get("username")?,
        None => "Unknown".to_string(),
    };

    sqlx::query("DELETE FROM playlists WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    activity::insert_entry(conn, None, tombstone, &details(&name)).await?;

    sqlx::query("DELETE FROM activity_log WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    Ok(name)
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// Map a UNIQUE violation to a 400 with `message`; the column in the
/// store's message decides which of username/email clashed.
fn conflict_or_store(e: sqlx::Error, message: &str) -> AppError {
    if !is_unique_violation(&e) {
        return e.into();
    }

    let detail = e.to_string();
    if detail.contains("users.username") {
        AppError::Conflict(USERNAME_TAKEN.to_string())
    } else if detail.contains("users.email") {
        AppError::Conflict(EMAIL_TAKEN.to_string())
    } else {
        AppError::Conflict(message.to_string())
    }
}
