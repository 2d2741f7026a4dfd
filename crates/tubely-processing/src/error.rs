use tubely_core::AppError;

/// Errors raised while validating, staging, or inspecting an upload
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    #[error("Content type {content_type} not allowed (allowed: {allowed:?})")]
    UnsupportedMediaType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Invalid media type configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Upload exceeds {max} bytes")]
    UploadTooLarge { max: u64 },

    #[error("Failed to read upload stream: {0}")]
    UploadStream(#[source] std::io::Error),

    #[error("Failed to stage upload: {0}")]
    Staging(#[from] std::io::Error),

    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    #[error("Unreadable probe output: {0}")]
    InvalidProbeOutput(String),

    #[error("Probe reported no streams")]
    NoStreams,

    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::InvalidContentType(_)
            | ProcessingError::UploadTooLarge { .. }
            | ProcessingError::UploadStream(_) => AppError::MalformedUpload(err.to_string()),
            ProcessingError::UnsupportedMediaType { .. } => {
                AppError::UnsupportedMediaType(err.to_string())
            }
            ProcessingError::InvalidConfiguration(_) | ProcessingError::Staging(_) => {
                AppError::Internal(err.to_string())
            }
            ProcessingError::ProbeFailed(_)
            | ProcessingError::InvalidProbeOutput(_)
            | ProcessingError::NoStreams
            | ProcessingError::InvalidDimensions { .. } => {
                AppError::ClassificationFailure(err.to_string())
            }
        }
    }
}
