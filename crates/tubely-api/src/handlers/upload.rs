use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use tubely_core::{AssetKind, Video};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    put,
    path = "/videos/{id}/thumbnail",
    tag = "uploads",
    params(
        ("id" = String, Path, description = "Video ID (UUID)")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Thumbnail stored and record updated", body = Video),
        (status = 400, description = "Invalid ID or malformed upload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 415, description = "Content type not accepted", body = ErrorResponse),
        (status = 502, description = "Storage backend failed", body = ErrorResponse)
    )
)]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    request: Request,
) -> Result<Json<Video>, HttpAppError> {
    upload(&state, &raw_id, AssetKind::Thumbnail, request).await
}

#[utoipa::path(
    put,
    path = "/videos/{id}/video",
    tag = "uploads",
    params(
        ("id" = String, Path, description = "Video ID (UUID)")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video classified, stored and record updated", body = Video),
        (status = 400, description = "Invalid ID or malformed upload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 415, description = "Content type not accepted", body = ErrorResponse),
        (status = 500, description = "Video could not be inspected", body = ErrorResponse),
        (status = 502, description = "Storage backend failed", body = ErrorResponse)
    )
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    request: Request,
) -> Result<Json<Video>, HttpAppError> {
    upload(&state, &raw_id, AssetKind::Video, request).await
}

async fn upload(
    state: &AppState,
    raw_id: &str,
    kind: AssetKind,
    request: Request,
) -> Result<Json<Video>, HttpAppError> {
    let (video_id, user_id) = state.validator.validate(raw_id, request.headers())?;
    let outcome = state.pipeline.run(video_id, user_id, kind, request).await?;
    Ok(Json(outcome.video))
}
