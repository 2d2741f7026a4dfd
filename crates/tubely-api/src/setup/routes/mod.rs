//! Route configuration and setup.

mod health;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubely_core::{AssetKind, Config, StorageBackend};
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;

/// Room for multipart boundaries and part headers on top of the file itself.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;
const JSON_BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let upload = config.upload();

    let video_routes = Router::new()
        .route(
            "/videos",
            post(handlers::videos::create_video)
                .get(handlers::videos::list_videos)
                .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT_BYTES)),
        )
        .route(
            "/videos/{id}",
            get(handlers::videos::get_video).delete(handlers::videos::delete_video),
        )
        .route(
            "/videos/{id}/thumbnail",
            put(handlers::upload::upload_thumbnail).layer(DefaultBodyLimit::max(
                upload.max_size_bytes(AssetKind::Thumbnail) + FORM_OVERHEAD_BYTES,
            )),
        )
        .route(
            "/videos/{id}/video",
            put(handlers::upload::upload_video).layer(DefaultBodyLimit::max(
                upload.max_size_bytes(AssetKind::Video) + FORM_OVERHEAD_BYTES,
            )),
        )
        .with_state(state);

    let mut app = video_routes
        .route("/health", get(health::liveness_check))
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }));

    if config.storage_backend() == StorageBackend::Local {
        tracing::info!(
            assets_root = %config.assets_root().display(),
            "Serving local assets at /assets"
        );
        app = app.nest_service("/assets", ServeDir::new(config.assets_root()));
    }

    Ok(app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    ))
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
