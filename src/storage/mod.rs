//! Object storage backends for finished archive files.
//!
//! The sweep uploads each closed archive file exactly once, under a key
//! equal to its file name (plus any configured prefix). The delete that
//! follows is only attempted after `put` returns success.

mod filesystem;
mod s3;

use std::sync::Arc;

use async_trait::async_trait;
pub use filesystem::FilesystemObjectStore;
pub use s3::S3ObjectStore;
use thiserror::Error;

use crate::config::{ArchiveBackend, ArchiveStorageConfig, FilesystemStorageConfig};

/// Errors during archive upload. Fatal: the sweep stops and the delete that
/// would have followed is never attempted.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("S3 upload failed: {0}")]
    S3(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage configuration error: {0}")]
    Config(String),
}

/// Destination for finished archive files.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `content` under `key`. Content type is textual tabular data.
    async fn put(&self, key: &str, content: &[u8]) -> Result<(), UploadError>;

    /// Name of the backend, for logging.
    fn backend_name(&self) -> &'static str;
}

/// Build the configured object store backend.
pub async fn create_object_store(
    config: &ArchiveStorageConfig,
) -> Result<Arc<dyn ObjectStore>, UploadError> {
    match config.backend {
        ArchiveBackend::S3 => {
            let s3_config = config.s3.clone().ok_or_else(|| {
                UploadError::Config("S3 backend selected without [storage.s3]".into())
            })?;
            Ok(Arc::new(S3ObjectStore::new(s3_config).await?))
        }
        ArchiveBackend::Filesystem => {
            let fs_config = config.filesystem.clone().unwrap_or_else(|| {
                FilesystemStorageConfig {
                    path: std::env::temp_dir()
                        .join("mailsweep-archives")
                        .to_string_lossy()
                        .to_string(),
                    create_dir: true,
                }
            });
            Ok(Arc::new(FilesystemObjectStore::new(fs_config)?))
        }
    }
}
