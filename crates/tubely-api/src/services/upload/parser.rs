use axum::extract::multipart::{Field, Multipart};
use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;
use tubely_core::{AppError, AssetKind, UploadConfig};
use tubely_processing::{MediaType, MediaTypeRegistry, ProcessingError, ScratchStager, StagedFile};

/// Upload bytes after parsing.
#[derive(Debug)]
pub enum UploadBody {
    /// Small assets kept in memory
    InMemory(Bytes),
    /// Videos copied to a scratch file so they can be probed and re-read
    Staged(StagedFile),
}

#[derive(Debug)]
pub struct ParsedUpload {
    pub media_type: MediaType,
    pub body: UploadBody,
}

impl ParsedUpload {
    pub fn size(&self) -> u64 {
        match &self.body {
            UploadBody::InMemory(bytes) => bytes.len() as u64,
            UploadBody::Staged(staged) => staged.size(),
        }
    }
}

/// Extracts the single file field for an asset kind from a multipart body.
#[derive(Debug, Clone)]
pub struct UploadParser {
    registry: MediaTypeRegistry,
    stager: ScratchStager,
    max_thumbnail_bytes: u64,
    max_video_bytes: u64,
}

impl UploadParser {
    pub fn new(registry: MediaTypeRegistry, stager: ScratchStager, limits: &UploadConfig) -> Self {
        Self {
            registry,
            stager,
            max_thumbnail_bytes: limits.max_size_bytes(AssetKind::Thumbnail) as u64,
            max_video_bytes: limits.max_size_bytes(AssetKind::Video) as u64,
        }
    }

    pub fn max_bytes(&self, kind: AssetKind) -> u64 {
        match kind {
            AssetKind::Thumbnail => self.max_thumbnail_bytes,
            AssetKind::Video => self.max_video_bytes,
        }
    }

    /// Find the field named after `kind`, check its declared content type,
    /// then read its bytes. Fields with other names are skipped unread.
    ///
    /// The content type is checked before any file bytes are consumed.
    pub async fn parse(
        &self,
        mut multipart: Multipart,
        kind: AssetKind,
    ) -> Result<ParsedUpload, AppError> {
        let field_name = kind.field_name();

        let field = loop {
            match multipart.next_field().await.map_err(|e| {
                AppError::MalformedUpload(format!("Failed to read multipart: {}", e.body_text()))
            })? {
                Some(field) if field.name() == Some(field_name) => break field,
                Some(_) => continue,
                None => {
                    return Err(AppError::MalformedUpload(format!(
                        "Missing form field '{}'",
                        field_name
                    )))
                }
            }
        };

        let declared = field.content_type().map(str::to_owned).ok_or_else(|| {
            AppError::MalformedUpload(format!("Missing Content-Type for '{}'", field_name))
        })?;
        let media_type = self.registry.validate(kind, &declared)?;

        let max_bytes = self.max_bytes(kind);
        let body = match kind {
            AssetKind::Thumbnail => UploadBody::InMemory(read_bounded(field, max_bytes).await?),
            AssetKind::Video => {
                let reader = StreamReader::new(field.map_err(std::io::Error::other));
                let suffix = format!(".{}", media_type.extension());
                UploadBody::Staged(
                    self.stager
                        .stage(Box::pin(reader), max_bytes, &suffix)
                        .await?,
                )
            }
        };

        let parsed = ParsedUpload { media_type, body };
        if parsed.size() == 0 {
            return Err(AppError::MalformedUpload(format!(
                "Form field '{}' is empty",
                field_name
            )));
        }

        tracing::debug!(
            kind = %kind,
            content_type = %parsed.media_type,
            size_bytes = parsed.size(),
            "Multipart upload parsed"
        );

        Ok(parsed)
    }
}

async fn read_bounded(mut field: Field<'_>, max_bytes: u64) -> Result<Bytes, AppError> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(|e| {
        AppError::MalformedUpload(format!("Failed to read file data: {}", e.body_text()))
    })? {
        if (buffer.len() + chunk.len()) as u64 > max_bytes {
            return Err(ProcessingError::UploadTooLarge { max: max_bytes }.into());
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer.freeze())
}
