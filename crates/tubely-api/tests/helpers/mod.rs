//! Test helpers: build AppState and router for integration tests.
//!
//! External collaborators are replaced: ffprobe by [`FakeProber`], the
//! object store by [`RecordingStorage`], Postgres by `InMemoryVideoRepository`.

#![allow(dead_code)]

pub mod auth;
pub mod fakes;

use std::path::Path;
use std::sync::Arc;

use axum_test::TestServer;
use tempfile::TempDir;
use tubely_api::setup::routes;
use tubely_api::AppState;
use tubely_core::{
    Config, ServerConfig, StorageBackend, StorageConfig, TubelyConfig, UploadConfig, Video,
};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_storage::{LocalStorage, Storage};
use uuid::Uuid;

pub use auth::{bearer, token_for, TEST_JWT_SECRET};
pub use fakes::{FailingUpdates, FakeProber, RecordingStorage};

/// Test application: server plus handles on the collaborators behind it.
pub struct TestApp {
    pub server: TestServer,
    pub videos: Arc<InMemoryVideoRepository>,
    pub storage: Arc<RecordingStorage>,
    pub prober: Arc<FakeProber>,
    pub scratch_dir: TempDir,
    pub assets_dir: TempDir,
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::default()
    }

    pub async fn spawn() -> Self {
        Self::builder().build().await
    }

    /// Insert a record owned by `owner` straight into the repository.
    pub async fn seed_video(&self, owner: Uuid) -> Video {
        let video = Video::new(owner, "Boots on the ground".to_string(), String::new());
        self.videos.insert(video.clone()).await;
        video
    }

    pub async fn stored_video(&self, id: Uuid) -> Video {
        self.videos
            .get(id)
            .await
            .expect("repository read failed")
            .expect("video missing")
    }

    /// Number of entries currently in the scratch directory.
    pub fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.scratch_dir.path())
            .expect("scratch dir readable")
            .count()
    }
}

pub struct TestAppBuilder {
    prober: FakeProber,
    backend: StorageBackend,
    failing_updates: bool,
    max_thumbnail_size_bytes: usize,
    max_video_size_bytes: usize,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        let defaults = UploadConfig::default();
        Self {
            prober: FakeProber::dimensions(1920, 1080),
            backend: StorageBackend::Embedded,
            failing_updates: false,
            max_thumbnail_size_bytes: defaults.max_thumbnail_size_bytes,
            max_video_size_bytes: 64 * 1024,
        }
    }
}

impl TestAppBuilder {
    pub fn prober(mut self, prober: FakeProber) -> Self {
        self.prober = prober;
        self
    }

    /// Use a real `LocalStorage` rooted in a temp dir and serve it at `/assets`.
    pub fn local_backend(mut self) -> Self {
        self.backend = StorageBackend::Local;
        self
    }

    /// Use the real `EmbeddedStorage`.
    pub fn embedded_backend(mut self) -> Self {
        self.backend = StorageBackend::Embedded;
        self
    }

    pub fn failing_updates(mut self) -> Self {
        self.failing_updates = true;
        self
    }

    pub fn max_thumbnail_size_bytes(mut self, max: usize) -> Self {
        self.max_thumbnail_size_bytes = max;
        self
    }

    pub fn max_video_size_bytes(mut self, max: usize) -> Self {
        self.max_video_size_bytes = max;
        self
    }

    pub async fn build(self) -> TestApp {
        self.build_with(None).await
    }

    /// Build with the real storage backend selected on the builder instead of
    /// the recording fake.
    pub async fn build_with_real_storage(self) -> TestApp {
        let backend = self.backend;
        self.build_with(Some(backend)).await
    }

    async fn build_with(self, real_backend: Option<StorageBackend>) -> TestApp {
        let scratch_dir = TempDir::new().expect("scratch dir");
        let assets_dir = TempDir::new().expect("assets dir");

        let config = test_config(
            self.backend,
            scratch_dir.path(),
            assets_dir.path(),
            self.max_thumbnail_size_bytes,
            self.max_video_size_bytes,
        );

        let videos = Arc::new(InMemoryVideoRepository::new());
        let repository: Arc<dyn VideoRepository> = if self.failing_updates {
            Arc::new(FailingUpdates::new(videos.clone()))
        } else {
            videos.clone()
        };

        let recording = Arc::new(RecordingStorage::default());
        let storage: Arc<dyn Storage> = match real_backend {
            None => recording.clone(),
            Some(StorageBackend::Local) => Arc::new(
                LocalStorage::new(assets_dir.path(), config.assets_base_url().to_string())
                    .await
                    .expect("local storage"),
            ),
            Some(StorageBackend::Embedded) => Arc::new(tubely_storage::EmbeddedStorage::new()),
            Some(StorageBackend::S3) => panic!("S3 is not available in tests"),
        };

        let prober = Arc::new(self.prober);
        let state = Arc::new(
            AppState::new(config.clone(), repository, storage, prober.clone())
                .expect("Failed to build state"),
        );

        let app = routes::setup_routes(&config, state).expect("Failed to setup routes");
        let server =
            TestServer::new(app.into_make_service()).expect("Failed to create test server");

        TestApp {
            server,
            videos,
            storage: recording,
            prober,
            scratch_dir,
            assets_dir,
        }
    }
}

pub fn test_config(
    backend: StorageBackend,
    scratch_dir: &Path,
    assets_root: &Path,
    max_thumbnail_size_bytes: usize,
    max_video_size_bytes: usize,
) -> Config {
    Config(Box::new(TubelyConfig {
        server: ServerConfig {
            server_port: 8091,
            environment: "test".to_string(),
            cors_origins: vec!["*".to_string()],
            jwt_secret: TEST_JWT_SECRET.to_string(),
            database_url: None,
            db_max_connections: 5,
            db_timeout_seconds: 30,
        },
        storage: StorageConfig {
            backend,
            assets_root: assets_root.to_path_buf(),
            assets_base_url: "http://localhost:8091/assets".to_string(),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
        },
        upload: UploadConfig {
            max_thumbnail_size_bytes,
            max_video_size_bytes,
            scratch_dir: scratch_dir.to_path_buf(),
            ..UploadConfig::default()
        },
    }))
}
