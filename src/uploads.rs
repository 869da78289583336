use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use axum::extract::multipart::{Field, MultipartError};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use tracing::warn;
use ulid::Ulid;

use crate::catalog::DownloadCatalog;

/// Largest installer accepted through the admin panel (500 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Why an upload was refused before it could reach the storage directory.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("filename not allowed: {0:?}")]
    NameNotAllowed(String),
    #[error("upload exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Rejected(#[from] UploadRejection),
    #[error("multipart field carried no filename")]
    MissingFileName,
    #[error("no file field in upload")]
    MissingFile,
    #[error("failed to read upload stream: {0}")]
    Multipart(#[from] MultipartError),
    #[error("failed to persist upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Whitelist and size policy for admin uploads.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    allowed: BTreeSet<String>,
    max_bytes: u64,
}

impl UploadValidator {
    pub fn new(allowed: BTreeSet<String>, max_bytes: u64) -> Self {
        Self { allowed, max_bytes }
    }

    pub fn for_catalog(catalog: &DownloadCatalog, max_bytes: u64) -> Self {
        Self::new(catalog.allowed_filenames().clone(), max_bytes)
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Accept the name only on an exact, case-sensitive match with a catalog filename.
    pub fn check_name<'a>(&'a self, original_name: &str) -> Result<&'a str, UploadRejection> {
        self.allowed
            .get(original_name)
            .map(String::as_str)
            .ok_or_else(|| UploadRejection::NameNotAllowed(original_name.to_string()))
    }

    pub fn check_size(&self, byte_count: u64) -> Result<(), UploadRejection> {
        if byte_count > self.max_bytes {
            return Err(UploadRejection::TooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    pub fn validate(&self, original_name: &str, byte_count: u64) -> Result<(), UploadRejection> {
        self.check_name(original_name)?;
        self.check_size(byte_count)
    }
}

/// A file that passed validation and now backs its catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUpload {
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Temporary file that is removed unless the upload is committed.
struct PartialUpload {
    path: PathBuf,
    committed: bool,
}

impl PartialUpload {
    fn new(root: &Path, filename: &str) -> Self {
        Self {
            path: root.join(format!(".{filename}.{}.uploading", Ulid::new())),
            committed: false,
        }
    }

    async fn commit(mut self, target: &Path) -> Result<(), std::io::Error> {
        fs::rename(&self.path, target).await?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PartialUpload {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    target: "upload",
                    %err,
                    path = %self.path.display(),
                    "failed to remove partial upload"
                );
            }
        }
    }
}

/// Stream a multipart file field into the storage directory.
///
/// The name is checked before any byte is written and the running size after every
/// chunk. Data lands in a temporary file that replaces the catalog file only once the
/// stream completes, so a failed upload leaves the previous installer untouched.
pub async fn persist_upload(
    mut field: Field<'_>,
    validator: &UploadValidator,
    root: &Path,
) -> Result<PersistedUpload, UploadError> {
    let original_name = field.file_name().ok_or(UploadError::MissingFileName)?;
    let filename = validator.check_name(original_name)?.to_string();

    let partial = PartialUpload::new(root, &filename);
    let mut file = fs::File::create(&partial.path).await?;
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = field.chunk().await? {
        bytes_written = bytes_written.saturating_add(chunk.len() as u64);
        validator.check_size(bytes_written)?;
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    let target = root.join(&filename);
    partial.commit(&target).await?;

    Ok(PersistedUpload {
        filename,
        path: target,
        size_bytes: bytes_written,
    })
}
