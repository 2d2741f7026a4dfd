//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use tubely_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely API",
        version = "0.1.0",
        description = "Video records with thumbnail and video uploads. Uploaded videos are classified by aspect ratio and stored under an orientation prefix."
    ),
    paths(
        handlers::videos::create_video,
        handlers::videos::list_videos,
        handlers::videos::get_video,
        handlers::videos::delete_video,
        handlers::upload::upload_thumbnail,
        handlers::upload::upload_video,
    ),
    components(
        schemas(
            models::Video,
            models::CreateVideoRequest,
            models::AssetKind,
            models::Orientation,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "videos", description = "Video record management"),
        (name = "uploads", description = "Thumbnail and video uploads")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_paths_documented() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/videos/{id}/thumbnail"));
        assert!(doc.paths.paths.contains_key("/videos/{id}/video"));
        assert!(doc.paths.paths.contains_key("/videos"));
    }
}
