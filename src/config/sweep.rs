//! Retention policy and file-rotation settings.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Retention sweep settings.
///
/// `retention_days` defines the cutoff: records sent before midnight UTC of
/// (today - retention_days) qualify for the sweep. `file_record_budget`
/// bounds how many messages are written to one archive file before it is
/// rotated out (uploaded, then its records deleted).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionSweepConfig {
    /// Number of days of records to keep. Required.
    pub retention_days: u32,

    /// Maximum number of messages per archive file before rotation.
    /// 0 means unbounded: the whole sweep goes into a single file.
    /// Default: 10000
    #[serde(default = "default_file_record_budget")]
    pub file_record_budget: u32,

    /// Base name for archive files.
    /// Default: "mail_archive"
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Directory where archive files are written before upload.
    /// Default: the system temporary directory
    #[serde(default = "default_spool_dir")]
    pub spool_dir: String,

    /// If true, archive files are written locally and the summary reports
    /// what would happen, but nothing is uploaded or deleted.
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,
}

fn default_file_record_budget() -> u32 {
    10_000
}

fn default_file_prefix() -> String {
    "mail_archive".to_string()
}

fn default_spool_dir() -> String {
    std::env::temp_dir().to_string_lossy().to_string()
}

impl RetentionSweepConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "sweep.file_prefix must not be empty".into(),
            ));
        }
        if self.spool_dir.is_empty() {
            return Err(ConfigError::Validation(
                "sweep.spool_dir must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let toml = r#"
            retention_days = 30
        "#;
        let config: RetentionSweepConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.retention_days, 30);
        assert_eq!(config.file_record_budget, 10_000);
        assert_eq!(config.file_prefix, "mail_archive");
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unbounded_budget_is_valid() {
        let toml = r#"
            retention_days = 30
            file_record_budget = 0
        "#;
        let config: RetentionSweepConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.file_record_budget, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let toml = r#"
            retention_days = 30
            file_prefix = ""
        "#;
        let config: RetentionSweepConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }
}
