use crate::activity::ActionType;
use crate::errors::{AppError, ResultExt};
use crate::users::UserSession;
use crate::AppState;
use super::extract::JsonBody;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserSession,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = state
        .users
        .login(&body.email, &body.password)
        .await
        .or_internal("Internal server error")?;

    Ok(Json(LoginResponse { user }))
}

/// POST /api/register
///
/// Failures carry the text under `message` as well as `error`; older clients
/// read `message` on this route.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let id = state
        .users
        .register(&body.username, &body.email, &body.password)
        .await
        .or_internal("Registration failed.")
        .map_err(|e| {
            let message = e.public_message();
            (e.status(), Json(json!({ "error": message, "message": message })))
        })?;

    state
        .activity
        .log(
            Some(id),
            ActionType::UserRegistered,
            "joined the platform as a new member!",
        )
        .await;

    Ok(Json(json!({
        "message": "User registered! You can now login."
    })))
}
