pub mod models;

use crate::errors::AppError;
pub use models::{ActionType, ActivityEntry};
use sqlx::{Pool, Sqlite, SqliteConnection};

pub const DEFAULT_FEED_LIMIT: i64 = 50;
pub const MAX_FEED_LIMIT: i64 = 500;

/// Append-mostly audit trail of user and admin actions.
#[derive(Clone)]
pub struct ActivityLogger {
    pool: Pool<Sqlite>,
}

impl ActivityLogger {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        user_id: Option<i64>,
        action: ActionType,
        details: &str,
    ) -> Result<i64, AppError> {
        let mut conn = self.pool.acquire().await?;
        insert_entry(&mut conn, user_id, action, details).await
    }

    /// Best-effort: a failed write is reported to the server log and dropped.
    pub async fn log(&self, user_id: Option<i64>, action: ActionType, details: &str) {
        if let Err(e) = self.record(user_id, action, details).await {
            log::error!(
                "Failed to log activity {} for user {:?}: {}",
                action,
                user_id,
                e
            );
        }
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<ActivityEntry>, AppError> {
        let entries = sqlx::query_as::<_, ActivityEntry>(
            r#"
            SELECT
                al.id, al.user_id, al.action_type, al.details, al.created_at,
                COALESCE(u.username, 'System') as username
            FROM activity_log al
            LEFT JOIN users u ON al.user_id = u.id
            ORDER BY al.created_at DESC, al.id DESC
            LIMIT ?
            "#,
        )
        .bind(limit.clamp(1, MAX_FEED_LIMIT))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

/// Insert on an existing connection so cascades can write their tombstone
/// inside their own transaction.
pub async fn insert_entry(
    conn: &mut SqliteConnection,
    user_id: Option<i64>,
    action: ActionType,
    details: &str,
) -> Result<i64, AppError> {
    let result = sqlx::query(
        "INSERT INTO activity_log (user_id, action_type, details) VALUES (?, ?, ?)",
    )
    .bind(user_id)
    .bind(action.as_str())
    .bind(details)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}
