//! Scratch staging of upload streams.
//!
//! A [`StagedFile`] is created before the first byte is copied, so the
//! backing file is removed on every exit path: explicit cleanup, an error
//! during the copy, or the owning future being dropped when a client
//! disconnects.

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use crate::error::ProcessingError;

const COPY_BUFFER_SIZE: usize = 64 * 1024;
const SCRATCH_PREFIX: &str = "tubely-upload-";

/// Copies upload streams into uniquely named temporary files.
#[derive(Debug, Clone)]
pub struct ScratchStager {
    dir: PathBuf,
}

impl ScratchStager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `reader` into a new scratch file.
    ///
    /// Fails with [`ProcessingError::UploadTooLarge`] as soon as more than
    /// `max_bytes` have been read; the partial file is removed.
    pub async fn stage<R>(
        &self,
        mut reader: R,
        max_bytes: u64,
        suffix: &str,
    ) -> Result<StagedFile, ProcessingError>
    where
        R: AsyncRead + Unpin,
    {
        let start = std::time::Instant::now();

        let named = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .suffix(suffix)
            .tempfile_in(&self.dir)?;
        let (std_file, temp_path) = named.into_parts();
        let mut staged = StagedFile {
            path: temp_path.to_path_buf(),
            temp_path: Some(temp_path),
            size: 0,
        };
        let mut file = File::from_std(std_file);

        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        loop {
            let read = reader
                .read(&mut buf)
                .await
                .map_err(ProcessingError::UploadStream)?;
            if read == 0 {
                break;
            }

            staged.size += read as u64;
            if staged.size > max_bytes {
                tracing::debug!(
                    path = %staged.path.display(),
                    max_bytes,
                    "Upload exceeded size ceiling while staging"
                );
                return Err(ProcessingError::UploadTooLarge { max: max_bytes });
            }

            file.write_all(&buf[..read]).await?;
        }

        file.flush().await?;
        file.sync_all().await?;

        tracing::debug!(
            path = %staged.path.display(),
            size_bytes = staged.size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload staged"
        );

        Ok(staged)
    }
}

/// A staged upload on disk, deleted at most once.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    temp_path: Option<TempPath>,
    size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Open an independent reader positioned at the start of the file.
    pub async fn open_reader(&self) -> Result<File, ProcessingError> {
        Ok(File::open(&self.path).await?)
    }

    /// Delete the file. Calling this again is a no-op.
    pub fn cleanup(&mut self) -> std::io::Result<()> {
        match self.temp_path.take() {
            Some(temp_path) => {
                temp_path.close()?;
                tracing::debug!(path = %self.path.display(), "Scratch file removed");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            tracing::warn!(
                error = %e,
                path = %self.path.display(),
                "Failed to remove scratch file"
            );
        }
    }
}
