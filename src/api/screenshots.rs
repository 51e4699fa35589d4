//! Payment-proof screenshots: list, upload, delete.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use super::cookies::UserToken;
use super::error::ApiError;
use crate::backend::Upload;
use crate::models::{MessageReply, ScreenshotsReply, UploadReply};
use crate::AppState;

/// Multipart field carrying the image
pub const UPLOAD_FIELD: &str = "screenshot";

/// GET /api/screenshots
pub async fn list_screenshots(
    State(state): State<Arc<AppState>>,
    UserToken(token): UserToken,
) -> Result<Json<ScreenshotsReply>, ApiError> {
    let reply = state.backend.screenshots(&token).await?;
    if !reply.body.success {
        warn!(status = %reply.status, "Screenshot list rejected");
        return Err(ApiError::rejected("Failed to fetch screenshots"));
    }

    Ok(Json(ScreenshotsReply {
        success: true,
        message: None,
        screenshots: reply.body.screenshots,
    }))
}

/// Pull the `screenshot` file out of the form; other fields are ignored
async fn read_upload(mut multipart: Multipart) -> Result<Option<Upload>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or(UPLOAD_FIELD).to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid upload: {}", e)))?;
        if bytes.is_empty() {
            return Ok(None);
        }

        return Ok(Some(Upload {
            file_name,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}

/// POST /api/screenshots (multipart, field `screenshot`)
pub async fn upload_screenshot(
    State(state): State<Arc<AppState>>,
    UserToken(token): UserToken,
    multipart: Multipart,
) -> Result<Json<UploadReply>, ApiError> {
    let Some(upload) = read_upload(multipart).await? else {
        return Err(ApiError::bad_request("No screenshot provided"));
    };
    let size = upload.bytes.len();

    let reply = state.backend.upload_screenshot(&token, upload).await?;
    if !reply.is_success() || !reply.body.success {
        return Err(ApiError::upstream(
            reply.body.message,
            reply.body.status.or(Some(reply.status.as_u16())),
            "Failed to upload screenshot",
        ));
    }
    info!(bytes = size, "Screenshot uploaded");

    Ok(Json(UploadReply {
        success: true,
        message: Some("Screenshot uploaded successfully".to_string()),
        screen_shot: reply.body.screen_shot,
    }))
}

/// DELETE /api/screenshots/{id}
pub async fn delete_screenshot(
    State(state): State<Arc<AppState>>,
    UserToken(token): UserToken,
    Path(id): Path<String>,
) -> Result<Json<MessageReply>, ApiError> {
    let reply = state.backend.delete_screenshot(&token, &id).await?;
    if !reply.is_success() || !reply.body.success {
        return Err(ApiError::upstream(
            reply.body.message,
            reply.body.status.or(Some(reply.status.as_u16())),
            "Failed to delete screenshot",
        ));
    }
    info!(screenshot_id = %id, "Screenshot deleted");

    Ok(Json(MessageReply::ok("Screenshot deleted successfully")))
}
