use crate::errors::{AppError, ResultExt};
use crate::uploads::UPLOAD_FIELD;
use crate::AppState;
use super::extract::PathParam;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};

/// POST /api/users/:id/upload
///
/// Takes the first multipart field named `profile_pic`; other fields are
/// skipped.
pub async fn upload_profile_pic(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, AppError> {
    let mut multipart = multipart?;
    let mut stored = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let original_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        stored = Some(
            state
                .uploads
                .save(id, original_name.as_deref(), &bytes)
                .await
                .or_internal("File upload failed")?,
        );
        break;
    }

    let stored = stored.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    match state.users.set_profile_pic(id, &stored.public_path).await {
        Ok(()) => Ok(Json(json!({
            "success": true,
            "profile_pic": stored.public_path,
        }))),
        Err(e) => {
            state.uploads.remove(&stored).await;
            Err(e).or_internal("File upload failed")
        }
    }
}
