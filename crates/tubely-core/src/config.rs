//! Configuration module
//!
//! Configuration is read once from the environment (and an optional `.env`
//! file) at startup, validated, and handed to component constructors.

use std::env;
use std::path::PathBuf;

use crate::models::AssetKind;
use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_THUMBNAIL_SIZE_MB: usize = 10;
const MAX_VIDEO_SIZE_MB: usize = 1024;
const MIN_JWT_SECRET_LEN: usize = 32;

/// HTTP server and persistence settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    /// When unset the service keeps records in memory.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
}

/// Storage backend selection and its per-backend settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub assets_root: PathBuf,
    pub assets_base_url: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
}

/// Upload limits, accepted content types, and media inspection settings
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub max_thumbnail_size_bytes: usize,
    pub max_video_size_bytes: usize,
    pub thumbnail_allowed_content_types: Vec<String>,
    pub video_allowed_content_types: Vec<String>,
    pub ffprobe_path: String,
    pub scratch_dir: PathBuf,
}

impl UploadConfig {
    /// Size ceiling applied to an upload of `kind`.
    pub fn max_size_bytes(&self, kind: AssetKind) -> usize {
        match kind {
            AssetKind::Thumbnail => self.max_thumbnail_size_bytes,
            AssetKind::Video => self.max_video_size_bytes,
        }
    }

    pub fn allowed_content_types(&self, kind: AssetKind) -> &[String] {
        match kind {
            AssetKind::Thumbnail => &self.thumbnail_allowed_content_types,
            AssetKind::Video => &self.video_allowed_content_types,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_thumbnail_size_bytes: MAX_THUMBNAIL_SIZE_MB * 1024 * 1024,
            max_video_size_bytes: MAX_VIDEO_SIZE_MB * 1024 * 1024,
            thumbnail_allowed_content_types: vec![
                "image/png".to_string(),
                "image/jpeg".to_string(),
            ],
            video_allowed_content_types: vec!["video/mp4".to_string()],
            ffprobe_path: "ffprobe".to_string(),
            scratch_dir: env::temp_dir(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TubelyConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<TubelyConfig>);

impl Config {
    fn inner(&self) -> &TubelyConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = TubelyConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().server.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn environment(&self) -> &str {
        &self.inner().server.environment
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server.server_port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().server.jwt_secret
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().server.cors_origins
    }

    pub fn database_url(&self) -> Option<&str> {
        self.inner().server.database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().server.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().server.db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage.backend
    }

    pub fn assets_root(&self) -> &std::path::Path {
        &self.inner().storage.assets_root
    }

    pub fn assets_base_url(&self) -> &str {
        &self.inner().storage.assets_base_url
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().storage.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().storage.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().storage.s3_endpoint.as_deref()
    }

    pub fn upload(&self) -> &UploadConfig {
        &self.inner().upload
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl TubelyConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let server = ServerConfig {
            server_port,
            environment,
            cors_origins,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            database_url: optional_var("DATABASE_URL"),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
        };

        let backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .parse::<StorageBackend>()?;

        let storage = StorageConfig {
            backend,
            assets_root: PathBuf::from(
                env::var("ASSETS_ROOT").unwrap_or_else(|_| "./assets".to_string()),
            ),
            assets_base_url: env::var("ASSETS_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}/assets", server_port)),
            s3_bucket: optional_var("S3_BUCKET"),
            s3_region: optional_var("S3_REGION").or_else(|| optional_var("AWS_REGION")),
            s3_endpoint: optional_var("S3_ENDPOINT"),
        };

        let max_thumbnail_size_mb = env::var("MAX_THUMBNAIL_SIZE_MB")
            .unwrap_or_else(|_| MAX_THUMBNAIL_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_THUMBNAIL_SIZE_MB);

        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        let defaults = UploadConfig::default();
        let upload = UploadConfig {
            max_thumbnail_size_bytes: max_thumbnail_size_mb * 1024 * 1024,
            max_video_size_bytes: max_video_size_mb * 1024 * 1024,
            thumbnail_allowed_content_types: optional_var("THUMBNAIL_ALLOWED_CONTENT_TYPES")
                .map(|raw| parse_list(&raw))
                .unwrap_or(defaults.thumbnail_allowed_content_types),
            video_allowed_content_types: optional_var("VIDEO_ALLOWED_CONTENT_TYPES")
                .map(|raw| parse_list(&raw))
                .unwrap_or(defaults.video_allowed_content_types),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or(defaults.ffprobe_path),
            scratch_dir: optional_var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
        };

        let config = TubelyConfig {
            server,
            storage,
            upload,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            ));
        }

        if let Some(ref url) = self.server.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.storage.backend == StorageBackend::S3 {
            if self.storage.s3_bucket.is_none() {
                return Err(anyhow::anyhow!(
                    "STORAGE_BACKEND=s3 requires S3_BUCKET to be set"
                ));
            }
            if self.storage.s3_region.is_none() {
                return Err(anyhow::anyhow!(
                    "STORAGE_BACKEND=s3 requires S3_REGION or AWS_REGION to be set"
                ));
            }
        }

        if self.upload.max_thumbnail_size_bytes == 0 || self.upload.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_THUMBNAIL_SIZE_MB and MAX_VIDEO_SIZE_MB must be greater than zero"
            ));
        }

        for kind in AssetKind::ALL {
            if self.upload.allowed_content_types(kind).is_empty() {
                return Err(anyhow::anyhow!(
                    "No allowed content types configured for {} uploads",
                    kind
                ));
            }
        }

        Ok(())
    }
}
