use std::sync::Arc;
use std::time::Instant;

use axum::extract::{FromRequest, Multipart, Request};
use tubely_core::{AppError, AssetKind, Orientation, Video};
use tubely_db::VideoRepository;
use tubely_processing::MediaClassifier;
use tubely_storage::{ByteSource, KeyGenerator, Storage};
use uuid::Uuid;

use super::parser::{ParsedUpload, UploadBody, UploadParser};

/// Result of a completed upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub video: Video,
    pub key: String,
    /// Set for video uploads only
    pub orientation: Option<Orientation>,
}

/// Runs one upload for an authenticated user.
///
/// The record's media URL is written only after the object has been stored.
/// A staged scratch file never outlives the call that created it.
#[derive(Clone)]
pub struct UploadPipeline {
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    parser: UploadParser,
    classifier: MediaClassifier,
    keys: KeyGenerator,
}

impl UploadPipeline {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        parser: UploadParser,
        classifier: MediaClassifier,
    ) -> Self {
        Self {
            videos,
            storage,
            parser,
            classifier,
            keys: KeyGenerator::new(),
        }
    }

    pub fn max_bytes(&self, kind: AssetKind) -> u64 {
        self.parser.max_bytes(kind)
    }

    #[tracing::instrument(
        skip(self, request),
        fields(video_id = %video_id, user_id = %user_id, kind = %kind)
    )]
    pub async fn run(
        &self,
        video_id: Uuid,
        user_id: Uuid,
        kind: AssetKind,
        request: Request,
    ) -> Result<UploadOutcome, AppError> {
        let start = Instant::now();

        let video = self
            .videos
            .get(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;
        if !video.is_owned_by(user_id) {
            return Err(AppError::AuthorizationFailure(format!(
                "User {} does not own video {}",
                user_id, video_id
            )));
        }

        // The body is not touched until ownership is established.
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::MalformedUpload(e.body_text()))?;
        let ParsedUpload { media_type, body } = self.parser.parse(multipart, kind).await?;

        let (orientation, source, mut staged) = match body {
            UploadBody::InMemory(bytes) => (None, ByteSource::Bytes(bytes), None),
            UploadBody::Staged(staged) => {
                let probe = self.classifier.classify(staged.path()).await?;
                let source = ByteSource::File(staged.path().to_path_buf());
                (Some(probe.orientation), source, Some(staged))
            }
        };

        let key = self.keys.generate(orientation, media_type.extension());
        let url = self.storage.store(&key, media_type.as_str(), source).await?;

        if let Some(staged) = staged.as_mut() {
            if let Err(e) = staged.cleanup() {
                tracing::warn!(error = %e, "Failed to remove scratch file after store");
            }
        }

        let video = match self.videos.update_media_url(video.id, kind, &url).await {
            Ok(video) => video,
            Err(e) => {
                self.discard_orphan(key);
                return Err(AppError::MetadataPersistFailure(e.to_string()));
            }
        };

        tracing::info!(
            storage_key = %key,
            content_type = %media_type,
            orientation = orientation.map(|o| o.as_str()),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload completed"
        );

        Ok(UploadOutcome {
            video,
            key,
            orientation,
        })
    }

    /// Best-effort removal of an object no record points to.
    fn discard_orphan(&self, key: String) {
        let storage = Arc::clone(&self.storage);
        tokio::spawn(async move {
            match storage.delete(&key).await {
                Ok(()) => tracing::info!(storage_key = %key, "Removed orphaned object"),
                Err(e) => tracing::warn!(
                    error = %e,
                    storage_key = %key,
                    "Failed to remove orphaned object"
                ),
            }
        });
    }
}
