//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use thiserror::Error;
use tubely_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::StorageFailure(err.to_string())
    }
}

/// Bytes handed to a backend for a single write.
///
/// Thumbnails arrive fully buffered; videos are handed over as the path of
/// their staged scratch file, which stays in place until `store` returns.
/// Backends that write elsewhere stream from the file instead of loading it.
pub enum ByteSource {
    Bytes(Bytes),
    File(PathBuf),
}

impl ByteSource {
    /// Load the source into memory.
    pub async fn into_bytes(self) -> std::io::Result<Bytes> {
        match self {
            ByteSource::Bytes(bytes) => Ok(bytes),
            ByteSource::File(path) => Ok(Bytes::from(tokio::fs::read(&path).await?)),
        }
    }
}

impl From<Bytes> for ByteSource {
    fn from(bytes: Bytes) -> Self {
        ByteSource::Bytes(bytes)
    }
}

impl std::fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ByteSource::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            ByteSource::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

/// Storage abstraction trait
///
/// All storage backends must implement this trait. Implementations are
/// created once at startup and shared across concurrent uploads.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `source` under `key` and return the public URL for it.
    ///
    /// A single attempt is made; failures are surfaced without retry.
    async fn store(
        &self,
        key: &str,
        content_type: &str,
        source: ByteSource,
    ) -> StorageResult<String>;

    /// Delete a file by its storage key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_into_bytes_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staged.mp4");
        std::fs::write(&path, b"frame data").unwrap();

        let bytes = ByteSource::File(path.clone()).into_bytes().await.unwrap();
        assert_eq!(&bytes[..], b"frame data");
        assert!(path.exists());
    }
}
