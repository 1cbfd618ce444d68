pub mod activity;
pub mod admin;
pub mod config;
pub mod credentials;
pub mod database;
pub mod errors;
pub mod playlist;
pub mod routes;
pub mod songs;
pub mod uploads;
pub mod users;

use activity::ActivityLogger;
use admin::AdminManager;
use config::Config;
use database::DatabaseManager;
use playlist::PlaylistManager;
use songs::SongManager;
use sqlx::{Pool, Sqlite};
use uploads::UploadStore;
use users::UserManager;

/// Shared by every request handler. Each manager holds a handle to the same
/// bounded connection pool.
#[derive(Clone)]
pub struct AppState {
    pub users: UserManager,
    pub songs: SongManager,
    pub playlists: PlaylistManager,
    pub activity: ActivityLogger,
    pub admin: AdminManager,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(pool: Pool<Sqlite>, uploads: UploadStore) -> Self {
        Self {
            users: UserManager::new(pool.clone()),
            songs: SongManager::new(pool.clone()),
            playlists: PlaylistManager::new(pool.clone()),
            activity: ActivityLogger::new(pool.clone()),
            admin: AdminManager::new(pool),
            uploads,
        }
    }
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let database = DatabaseManager::new(&config).await?;
    let uploads = UploadStore::open(config.upload_dir.clone()).await?;
    log::info!("Serving uploads from {:?}", uploads.dir());

    let state = AppState::new(database.pool.clone(), uploads);
    let app = routes::router(state, config.max_upload_bytes);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    database.pool.close().await;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
