use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::error::ProcessingError;

/// Pixel dimensions of the first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Reads frame dimensions from a video file on disk.
#[async_trait]
pub trait VideoProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<Dimensions, ProcessingError>;
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Parse `ffprobe -print_format json -show_streams` output.
pub fn parse_probe_output(stdout: &[u8]) -> Result<Dimensions, ProcessingError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ProcessingError::InvalidProbeOutput(e.to_string()))?;

    let stream = output.streams.first().ok_or(ProcessingError::NoStreams)?;
    match (stream.width, stream.height) {
        (Some(width), Some(height)) => Ok(Dimensions { width, height }),
        _ => Err(ProcessingError::InvalidProbeOutput(
            "first stream has no width/height".to_string(),
        )),
    }
}

/// Validate that a path doesn't contain shell metacharacters
fn validate_executable(path: &str) -> Result<(), ProcessingError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() || path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ProcessingError::InvalidConfiguration(format!(
            "Invalid ffprobe path: {}",
            path
        )));
    }
    Ok(())
}

/// [`VideoProber`] backed by the `ffprobe` executable.
pub struct FfprobeProber {
    ffprobe_path: String,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>) -> Result<Self, ProcessingError> {
        let ffprobe_path = ffprobe_path.into();
        validate_executable(&ffprobe_path)?;
        Ok(Self { ffprobe_path })
    }

    /// Run `ffprobe -version` and return the first line of its banner.
    pub async fn version(&self) -> Result<String, ProcessingError> {
        let output = Command::new(&self.ffprobe_path)
            .arg("-version")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ProcessingError::ProbeFailed(format!(
                    "Failed to execute {}: {}",
                    self.ffprobe_path, e
                ))
            })?;

        if !output.status.success() {
            return Err(ProcessingError::ProbeFailed(format!(
                "{} -version exited with {}",
                self.ffprobe_path, output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or("unknown").trim().to_string())
    }
}

#[async_trait]
impl VideoProber for FfprobeProber {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
    ))]
    async fn probe(&self, path: &Path) -> Result<Dimensions, ProcessingError> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ProcessingError::ProbeFailed(format!("Failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(
                status = %output.status,
                stderr = %stderr.trim(),
                "ffprobe exited with failure"
            );
            return Err(ProcessingError::ProbeFailed(format!(
                "ffprobe exited with {}",
                output.status
            )));
        }

        let dimensions = parse_probe_output(&output.stdout)?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis(),
            width = dimensions.width,
            height = dimensions.height,
            "Video probe completed"
        );

        Ok(dimensions)
    }
}
