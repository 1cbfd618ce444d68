use serde::{Deserialize, Serialize};

/// What a client learns about itself after logging in.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSession {
    pub id: i64,
    pub username: String,
    pub profile_pic: Option<String>,
    pub is_admin: bool,
}

/// Row shape of the admin user listing.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}
