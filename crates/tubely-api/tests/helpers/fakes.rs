use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tubely_core::models::CreateVideoRequest;
use tubely_core::{AppError, AssetKind, StorageBackend, Video};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_processing::{Dimensions, ProcessingError, VideoProber};
use tubely_storage::{ByteSource, Storage, StorageError, StorageResult};
use uuid::Uuid;

/// Stands in for ffprobe. Records every path it was asked to probe and
/// checks the file is present at that moment.
pub struct FakeProber {
    outcome: Result<Dimensions, String>,
    probed: Mutex<Vec<PathBuf>>,
}

impl FakeProber {
    pub fn dimensions(width: u32, height: u32) -> Self {
        Self {
            outcome: Ok(Dimensions { width, height }),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn probed(&self) -> Vec<PathBuf> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoProber for FakeProber {
    async fn probe(&self, path: &Path) -> Result<Dimensions, ProcessingError> {
        assert!(path.exists(), "probe called on a missing file");
        self.probed.lock().unwrap().push(path.to_path_buf());
        match &self.outcome {
            Ok(dimensions) => Ok(*dimensions),
            Err(message) => Err(ProcessingError::ProbeFailed(message.clone())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// In-memory storage that remembers every write and delete.
#[derive(Default)]
pub struct RecordingStorage {
    stored: Mutex<Vec<StoredObject>>,
    deleted: Mutex<Vec<String>>,
    fail_stores: AtomicBool,
}

impl RecordingStorage {
    pub fn fail_stores(&self) {
        self.fail_stores.store(true, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Vec<StoredObject> {
        self.stored.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn url_for(key: &str) -> String {
        format!("https://cdn.tubely.test/{}", key)
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn store(
        &self,
        key: &str,
        content_type: &str,
        source: ByteSource,
    ) -> StorageResult<String> {
        if self.fail_stores.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed(
                "PUT tubely-media: 503 SlowDown".to_string(),
            ));
        }
        let bytes = source.into_bytes().await?;
        self.stored.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            content_type: content_type.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(Self::url_for(key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Repository whose updates always fail; everything else is delegated.
pub struct FailingUpdates {
    inner: Arc<InMemoryVideoRepository>,
}

impl FailingUpdates {
    pub fn new(inner: Arc<InMemoryVideoRepository>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl VideoRepository for FailingUpdates {
    async fn create(&self, user_id: Uuid, request: CreateVideoRequest) -> Result<Video, AppError> {
        self.inner.create(user_id, request).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        self.inner.get(id).await
    }

    async fn update_media_url(
        &self,
        _id: Uuid,
        _kind: AssetKind,
        _url: &str,
    ) -> Result<Video, AppError> {
        Err(AppError::Internal("connection reset by peer".to_string()))
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        self.inner.list_by_user(user_id).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.inner.delete(id).await
    }
}
