use axum::extract::{Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use super::{ApiResult, AppState, AuthUser};
use crate::error::NotebridgeError;
use crate::models::FileUpload;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/files/upload", post(upload_file))
        .route("/api/files/upload/profile/{user_id}", post(upload_profile_picture))
        .route("/api/files/upload/lesson_pic/{lesson_id}", post(upload_lesson_picture))
        .route("/api/files/retrieve/{file_id}", get(retrieve_file))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    file_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileResponse {
    file_name: String,
    /// Base64 of the raw bytes
    file_content: String,
}

/// Pull the `file` part out of a multipart body
async fn read_upload(mut multipart: Multipart) -> ApiResult<FileUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| NotebridgeError::validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| NotebridgeError::validation(format!("Failed to read upload: {e}")))?;

        return Ok(FileUpload {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    Err(NotebridgeError::validation("Missing multipart field 'file'"))
}

async fn upload_file(
    State(state): State<AppState>,
    _caller: AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let upload = read_upload(multipart).await?;
    let file_id = state.files.upload_file(upload).await?;
    Ok(Json(UploadResponse { file_id }))
}

async fn upload_profile_picture(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    if !caller.is_self_or_admin(user_id) {
        return Err(NotebridgeError::forbidden("You can only upload your own profile picture"));
    }
    let upload = read_upload(multipart).await?;
    let file_id = state.files.upload_profile_picture(user_id, upload).await?;
    Ok(Json(UploadResponse { file_id }))
}

async fn upload_lesson_picture(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(lesson_id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    state.lessons.ensure_can_modify(&caller, lesson_id)?;
    let upload = read_upload(multipart).await?;
    let file_id = state.files.upload_lesson_picture(lesson_id, upload).await?;
    Ok(Json(UploadResponse { file_id }))
}

async fn retrieve_file(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(file_id): Path<String>,
) -> ApiResult<Json<FileResponse>> {
    let file = state.files.retrieve_file(&file_id).await?;
    Ok(Json(FileResponse {
        file_name: file.file_name,
        file_content: STANDARD.encode(file.content),
    }))
}
