use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_playlists: i64,
    pub total_songs: i64,
    pub total_logs: i64,
}

#[derive(Clone)]
pub struct AdminManager {
    pool: Pool<Sqlite>,
}

impl AdminManager {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn stats(&self) -> Result<DashboardStats, AppError> {
        Ok(DashboardStats {
            total_users: self.count("users").await?,
            total_playlists: self.count("playlists").await?,
            total_songs: self.count("songs").await?,
            total_logs: self.count("activity_log").await?,
        })
    }

    // `table` is always one of the literals above.
    async fn count(&self, table: &str) -> Result<i64, AppError> {
        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
