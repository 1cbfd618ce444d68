use crate::activity::ActionType;
use crate::errors::{AppError, ResultExt};
use crate::playlist::ProfilePlaylist;
use crate::AppState;
use super::extract::{JsonBody, PathParam};
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: String,
    pub profile_pic: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    pub password: String,
}

/// PUT /api/users/:id/update
pub async fn update_profile(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .users
        .update_profile(id, &body.username, body.profile_pic.as_deref())
        .await
        .or_internal("Failed to update profile")?;

    state
        .activity
        .log(Some(id), ActionType::ProfileUpdated, "updated their profile")
        .await;

    Ok(Json(json!({ "success": true, "message": "Profile updated" })))
}

/// PUT /api/users/:id/change-password
pub async fn change_password(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<ChangePasswordRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .users
        .change_password(id, &body.current_password, &body.new_password)
        .await
        .or_internal("Failed to change password")?;

    state
        .activity
        .log(Some(id), ActionType::PasswordChanged, "updated their password")
        .await;

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/users/:id/delete-account
pub async fn delete_account(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<DeleteAccountRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .users
        .delete_account(id, &body.password)
        .await
        .or_internal("Deletion failed")?;

    Ok(Json(json!({ "success": true })))
}

/// GET /api/profile/:user_id
pub async fn get_profile(
    State(state): State<AppState>,
    PathParam(user_id): PathParam<i64>,
) -> Result<Json<Vec<ProfilePlaylist>>, AppError> {
    let playlists = state
        .playlists
        .profile_playlists(user_id)
        .await
        .or_internal("Failed to load profile")?;

    Ok(Json(playlists))
}
