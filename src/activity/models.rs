use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    UserRegistered,
    ProfileUpdated,
    PasswordChanged,
    AccountDeleted,
    PlaylistCreated,
    SongRemoved,
    PlaylistDeleted,
    AdminAction,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::UserRegistered => "user_registered",
            ActionType::ProfileUpdated => "profile_updated",
            ActionType::PasswordChanged => "password_changed",
            ActionType::AccountDeleted => "account_deleted",
            ActionType::PlaylistCreated => "playlist_created",
            ActionType::SongRemoved => "song_removed",
            ActionType::PlaylistDeleted => "playlist_deleted",
            ActionType::AdminAction => "admin_action",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A log row joined with the acting user's display name.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityEntry {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action_type: String,
    pub details: Option<String>,
    pub created_at: String,
    pub username: String,
}
