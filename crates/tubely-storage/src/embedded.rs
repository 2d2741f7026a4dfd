use crate::traits::{ByteSource, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Embeds the uploaded bytes into the returned location as a `data:` URI.
///
/// Nothing is written anywhere; the record column holds the whole asset.
/// Only sensible for small thumbnails.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedStorage;

impl EmbeddedStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Storage for EmbeddedStorage {
    async fn store(
        &self,
        key: &str,
        content_type: &str,
        source: ByteSource,
    ) -> StorageResult<String> {
        let data = source
            .into_bytes()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Failed to read upload: {}", e)))?;
        let size = data.len();
        let url = format!("data:{};base64,{}", content_type, STANDARD.encode(&data));

        tracing::debug!(key = %key, size_bytes = size, "Embedded upload as data URI");

        Ok(url)
    }

    async fn delete(&self, _key: &str) -> StorageResult<()> {
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Embedded
    }
}
