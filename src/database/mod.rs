use crate::config::Config;
use crate::errors::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

/// How long a writer waits on the store lock before giving up.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct DatabaseManager {
    pub pool: Pool<Sqlite>,
}

impl DatabaseManager {
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        if let Some(parent) = config.database_path().and_then(|p| p.parent().map(|p| p.to_path_buf())) {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(&parent).await?;
            }
        }

        log::info!("Connecting to database at: {}", config.database_url);

        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| AppError::Config(format!("Invalid database url: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        // Waiters queue on an exhausted pool until acquire_timeout.
        // Write transactions open with a write so they queue on busy_timeout
        // instead of failing a read-to-write upgrade.
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        apply_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// Private in-memory database. Every connection to `:memory:` is its own
    /// database, so the pool is pinned to a single connection that never
    /// expires.
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        apply_schema(&pool).await?;

        Ok(Self { pool })
    }
}

async fn apply_schema(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    let schema = include_str!("schema.sql");

    for statement in schema.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt).execute(pool).await.map_err(|e| {
                AppError::Database(format!(
                    "Failed to execute schema statement '{}': {}",
                    stmt, e
                ))
            })?;
        }
    }

    Ok(())
}
