//! Profile picture storage on local disk.
//!
//! Files are named `<userId>-<unix millis>.<ext>` so repeated uploads for the
//! same user never overwrite each other, and are served back under
//! [`PUBLIC_PREFIX`].

use crate::errors::AppError;
use chrono::Utc;
use std::path::{Path, PathBuf};

pub const PUBLIC_PREFIX: &str = "/uploads";

/// Multipart field carrying the image.
pub const UPLOAD_FIELD: &str = "profile_pic";

#[derive(Debug, Clone, PartialEq)]
pub struct StoredUpload {
    pub file_name: String,
    pub public_path: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Creates the directory when it is missing.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        if !dir.exists() {
            tokio::fs::create_dir_all(&dir).await?;
            log::info!("Created upload directory {:?}", dir);
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn save(
        &self,
        user_id: i64,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredUpload, AppError> {
        let file_name = file_name_for(user_id, original_name, Utc::now().timestamp_millis());
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        log::info!("Stored upload {} ({} bytes) for user {}", file_name, bytes.len(), user_id);
        Ok(StoredUpload {
            public_path: format!("{}/{}", PUBLIC_PREFIX, file_name),
            file_name,
        })
    }

    pub async fn remove(&self, stored: &StoredUpload) {
        if let Err(e) = tokio::fs::remove_file(self.dir.join(&stored.file_name)).await {
            log::warn!("Could not remove orphaned upload {}: {}", stored.file_name, e);
        }
    }
}

/// Only the extension of the client's file name survives, and only when it
/// is plain alphanumeric.
pub fn file_name_for(user_id: i64, original_name: Option<&str>, millis: i64) -> String {
    let ext = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match ext {
        Some(ext) => format!("{}-{}.{}", user_id, millis, ext),
        None => format!("{}-{}", user_id, millis),
    }
}
