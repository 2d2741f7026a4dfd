//! Shared application state handed to every handler.

use std::sync::Arc;

use tubely_core::{AppError, Config};
use tubely_db::VideoRepository;
use tubely_processing::{MediaClassifier, MediaTypeRegistry, ScratchStager, VideoProber};
use tubely_storage::Storage;

use crate::auth::{JwtService, RequestValidator};
use crate::services::{UploadParser, UploadPipeline};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoRepository>,
    pub validator: RequestValidator,
    pub pipeline: UploadPipeline,
}

impl AppState {
    /// Wire the upload pipeline from its collaborators.
    ///
    /// Fails if the configured allow-lists do not cover every asset kind.
    pub fn new(
        config: Config,
        videos: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        prober: Arc<dyn VideoProber>,
    ) -> Result<Self, AppError> {
        let upload = config.upload();
        let registry = MediaTypeRegistry::from_config(upload)?;
        let stager = ScratchStager::new(upload.scratch_dir.clone());
        let parser = UploadParser::new(registry, stager, upload);
        let pipeline = UploadPipeline::new(
            videos.clone(),
            storage,
            parser,
            MediaClassifier::new(prober),
        );
        let validator = RequestValidator::new(Arc::new(JwtService::new(config.jwt_secret())));

        Ok(Self {
            config,
            videos,
            validator,
            pipeline,
        })
    }
}
