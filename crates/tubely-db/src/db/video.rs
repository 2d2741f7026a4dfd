use chrono::Utc;
use sqlx::{PgPool, Postgres};
use tubely_core::models::{CreateVideoRequest, Video};
use tubely_core::{AppError, AssetKind};
use uuid::Uuid;

const VIDEO_COLUMNS: &str =
    "id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at";

/// Trait for video record persistence
///
/// Ownership is not enforced here; callers compare `Video::user_id`
/// themselves.
#[async_trait::async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, request: CreateVideoRequest) -> Result<Video, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Set the URL column for `kind` only, leaving every other field as stored.
    /// Fails with `NotFound` if the row is gone.
    async fn update_media_url(
        &self,
        id: Uuid,
        kind: AssetKind,
        url: &str,
    ) -> Result<Video, AppError>;

    /// Records owned by `user_id`, newest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError>;

    /// Returns whether a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

fn media_column(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Thumbnail => "thumbnail_url",
        AssetKind::Video => "video_url",
    }
}

/// Repository for video records stored in PostgreSQL
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self, request), fields(db.table = "videos", db.operation = "insert"))]
    async fn create(&self, user_id: Uuid, request: CreateVideoRequest) -> Result<Video, AppError> {
        let video = Video::new(user_id, request.title, request.description);

        let video = sqlx::query_as::<Postgres, Video>(&format!(
            r#"
            INSERT INTO videos (id, user_id, title, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(video.id)
        .bind(video.user_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(video.created_at)
        .bind(video.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(&format!(
            "SELECT {} FROM videos WHERE id = $1",
            VIDEO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self, url), fields(db.table = "videos", db.operation = "update", db.record_id = %id, kind = %kind))]
    async fn update_media_url(
        &self,
        id: Uuid,
        kind: AssetKind,
        url: &str,
    ) -> Result<Video, AppError> {
        let updated = sqlx::query_as::<Postgres, Video>(&format!(
            r#"
            UPDATE videos
            SET {} = $2, updated_at = $3
            WHERE id = $1
            RETURNING {}
            "#,
            media_column(kind),
            VIDEO_COLUMNS
        ))
        .bind(id)
        .bind(url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        let videos = sqlx::query_as::<Postgres, Video>(&format!(
            "SELECT {} FROM videos WHERE user_id = $1 ORDER BY created_at DESC",
            VIDEO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
