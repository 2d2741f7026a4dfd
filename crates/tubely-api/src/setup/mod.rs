//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use tubely_core::Config;
use tubely_processing::FfprobeProber;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let videos = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    let upload = config.upload();
    let prober = FfprobeProber::new(upload.ffprobe_path.clone()).context("Invalid FFPROBE_PATH")?;
    let ffprobe_version = prober
        .version()
        .await
        .context("ffprobe is required for video uploads")?;
    tracing::info!(ffprobe = %ffprobe_version, "ffprobe available");
    tokio::fs::create_dir_all(&upload.scratch_dir)
        .await
        .with_context(|| format!("Failed to create scratch dir {}", upload.scratch_dir.display()))?;

    let state = Arc::new(
        AppState::new(config.clone(), videos, storage, Arc::new(prober))
            .context("Failed to build application state")?,
    );

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
