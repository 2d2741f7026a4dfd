//! Record management for the videos that uploads attach media to.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use tubely_core::models::{CreateVideoRequest, Video};
use tubely_core::AppError;

use crate::auth::RequestValidator;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/videos",
    tag = "videos",
    request_body = CreateVideoRequest,
    responses(
        (status = 201, description = "Video record created", body = Video),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse)
    )
)]
pub async fn create_video(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<CreateVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let user_id = state.validator.authenticate(&headers)?;

    if request.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title must not be empty".to_string()).into());
    }

    let video = state.videos.create(user_id, request).await?;
    tracing::info!(video_id = %video.id, user_id = %user_id, "Video record created");

    Ok((StatusCode::CREATED, Json(video)))
}

#[utoipa::path(
    get,
    path = "/videos",
    tag = "videos",
    responses(
        (status = 200, description = "Videos owned by the caller, newest first", body = Vec<Video>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse)
    )
)]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Video>>, HttpAppError> {
    let user_id = state.validator.authenticate(&headers)?;
    let videos = state.videos.list_by_user(user_id).await?;
    Ok(Json(videos))
}

#[utoipa::path(
    get,
    path = "/videos/{id}",
    tag = "videos",
    params(
        ("id" = String, Path, description = "Video ID (UUID)")
    ),
    responses(
        (status = 200, description = "Video record", body = Video),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Video>, HttpAppError> {
    let id = RequestValidator::parse_identifier(&raw_id)?;
    let video = state
        .videos
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;
    Ok(Json(video))
}

#[utoipa::path(
    delete,
    path = "/videos/{id}",
    tag = "videos",
    params(
        ("id" = String, Path, description = "Video ID (UUID)")
    ),
    responses(
        (status = 204, description = "Video record deleted"),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, HttpAppError> {
    let (id, user_id) = state.validator.validate(&raw_id, &headers)?;

    let video = state
        .videos
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;
    if !video.is_owned_by(user_id) {
        return Err(AppError::AuthorizationFailure(format!(
            "User {} does not own video {}",
            user_id, id
        ))
        .into());
    }

    if !state.videos.delete(id).await? {
        return Err(AppError::NotFound(format!("Video {} not found", id)).into());
    }
    tracing::info!(video_id = %id, user_id = %user_id, "Video record deleted");

    Ok(StatusCode::NO_CONTENT)
}
