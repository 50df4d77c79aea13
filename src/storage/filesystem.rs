//! Local-directory archive storage.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{ObjectStore, UploadError};
use crate::config::FilesystemStorageConfig;

pub struct FilesystemObjectStore {
    dir: PathBuf,
}

impl FilesystemObjectStore {
    pub fn new(config: FilesystemStorageConfig) -> Result<Self, UploadError> {
        let dir = PathBuf::from(&config.path);

        if config.create_dir {
            std::fs::create_dir_all(&dir)?;
        } else if !dir.is_dir() {
            return Err(UploadError::Config(format!(
                "archive directory does not exist: {}",
                dir.display()
            )));
        }

        info!(path = %dir.display(), "Initialized filesystem archive storage");
        Ok(Self { dir })
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put(&self, key: &str, content: &[u8]) -> Result<(), UploadError> {
        let path = self.dir.join(key);
        debug!(path = %path.display(), size = content.len(), "Storing archive");
        tokio::fs::write(&path, content).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_put_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FilesystemObjectStore::new(FilesystemStorageConfig {
            path: temp_dir.path().to_string_lossy().to_string(),
            create_dir: false,
        })
        .unwrap();

        store.put("a.csv", b"guid,recipient\n").await.unwrap();

        let written = std::fs::read(temp_dir.path().join("a.csv")).unwrap();
        assert_eq!(written, b"guid,recipient\n");
    }

    #[test]
    fn test_missing_dir_rejected_without_create() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        let result = FilesystemObjectStore::new(FilesystemStorageConfig {
            path: missing.to_string_lossy().to_string(),
            create_dir: false,
        });
        assert!(matches!(result, Err(UploadError::Config(_))));
    }

    #[test]
    fn test_create_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a/b");
        FilesystemObjectStore::new(FilesystemStorageConfig {
            path: nested.to_string_lossy().to_string(),
            create_dir: true,
        })
        .unwrap();
        assert!(nested.is_dir());
    }
}
