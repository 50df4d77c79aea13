//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Console logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "mailsweep=debug,sqlx=warn").
    /// Overridden by the RUST_LOG environment variable when set.
    /// Default: "info"
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format.
    /// Default: compact
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Console log output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(matches!(config.format, LogFormat::Compact));
    }

    #[test]
    fn test_parse_format() {
        let config: LoggingConfig = toml::from_str(r#"format = "json""#).unwrap();
        assert!(matches!(config.format, LogFormat::Json));
    }
}
