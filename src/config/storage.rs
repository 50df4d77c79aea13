//! Archive destination configuration.
//!
//! Finished archive files are uploaded to one of two backends:
//! - **S3**: S3-compatible object storage (AWS S3, MinIO, R2, ...)
//! - **Filesystem**: a local directory, useful for tests and air-gapped runs
//!
//! # Example
//!
//! ```toml
//! [storage]
//! backend = "s3"
//!
//! [storage.s3]
//! bucket = "mail-archives"
//! region = "us-east-1"
//! key_prefix = "retention"
//! # Credentials via env vars AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY
//! # or IAM role
//! ```

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Where finished archive files are uploaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveStorageConfig {
    /// Storage backend to use.
    #[serde(default)]
    pub backend: ArchiveBackend,

    /// S3 configuration (required when backend = "s3").
    #[serde(default)]
    pub s3: Option<S3StorageConfig>,

    /// Filesystem configuration (required when backend = "filesystem").
    #[serde(default)]
    pub filesystem: Option<FilesystemStorageConfig>,
}

impl Default for ArchiveStorageConfig {
    fn default() -> Self {
        Self {
            backend: ArchiveBackend::Filesystem,
            s3: None,
            filesystem: None,
        }
    }
}

impl ArchiveStorageConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            ArchiveBackend::S3 => {
                if self.s3.is_none() {
                    return Err(ConfigError::Validation(
                        "S3 storage backend requires [storage.s3] configuration".into(),
                    ));
                }
                self.s3.as_ref().unwrap().validate()
            }
            ArchiveBackend::Filesystem => {
                // Defaults to the system temp dir when unconfigured.
                Ok(())
            }
        }
    }
}

/// Archive storage backend selector.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveBackend {
    S3,
    #[default]
    Filesystem,
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct S3StorageConfig {
    /// Bucket to upload archive files into.
    pub bucket: String,

    /// AWS region. Falls back to the SDK's default resolution when unset.
    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint URL for S3-compatible services (MinIO, R2, ...).
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Key prefix prepended to every uploaded file name.
    #[serde(default)]
    pub key_prefix: Option<String>,

    /// Static credentials. When unset, the SDK's default chain is used
    /// (env vars, profile, IAM role).
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,

    /// Use path-style addressing (required by MinIO).
    #[serde(default)]
    pub force_path_style: bool,
}

impl S3StorageConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.is_empty() {
            return Err(ConfigError::Validation(
                "storage.s3.bucket must not be empty".into(),
            ));
        }
        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(ConfigError::Validation(
                "storage.s3 requires both access_key_id and secret_access_key, or neither".into(),
            ));
        }
        Ok(())
    }

    /// Full object key for an archive file name.
    pub fn object_key(&self, name: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}/{}", prefix.trim_end_matches('/'), name),
            None => name.to_string(),
        }
    }
}

/// Local directory backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesystemStorageConfig {
    /// Directory archive files are copied into.
    pub path: String,

    /// Create the directory if it doesn't exist.
    #[serde(default = "default_true")]
    pub create_dir: bool,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_filesystem() {
        let config = ArchiveStorageConfig::default();
        assert!(matches!(config.backend, ArchiveBackend::Filesystem));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_object_key_with_and_without_prefix() {
        let mut s3: S3StorageConfig = toml::from_str(r#"bucket = "b""#).unwrap();
        assert_eq!(s3.object_key("f.csv"), "f.csv");

        s3.key_prefix = Some("retention/".to_string());
        assert_eq!(s3.object_key("f.csv"), "retention/f.csv");
    }

    #[test]
    fn test_partial_credentials_rejected() {
        let s3: S3StorageConfig = toml::from_str(
            r#"
            bucket = "b"
            access_key_id = "AKIA..."
        "#,
        )
        .unwrap();
        assert!(s3.validate().is_err());
    }
}
