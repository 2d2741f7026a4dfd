use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tubely_core::models::{CreateVideoRequest, Video};
use tubely_core::{AppError, AssetKind};
use uuid::Uuid;

use super::VideoRepository;

/// Process-local [`VideoRepository`] used when no `DATABASE_URL` is set.
#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: RwLock<HashMap<Uuid, Video>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed record, replacing any existing one with the same id.
    pub async fn insert(&self, video: Video) {
        self.videos.write().await.insert(video.id, video);
    }
}

#[async_trait::async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create(&self, user_id: Uuid, request: CreateVideoRequest) -> Result<Video, AppError> {
        let video = Video::new(user_id, request.title, request.description);
        self.insert(video.clone()).await;
        Ok(video)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn update_media_url(
        &self,
        id: Uuid,
        kind: AssetKind,
        url: &str,
    ) -> Result<Video, AppError> {
        let mut videos = self.videos.write().await;
        let stored = videos
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;

        stored.set_media_url(kind, url.to_string());
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        let mut videos: Vec<Video> = self
            .videos
            .read()
            .await
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.videos.write().await.remove(&id).is_some())
    }
}
