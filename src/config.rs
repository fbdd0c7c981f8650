//! Configuration file handling.
//!
//! Settings come from an optional `budget-insight.toml`; command-line flags
//! override whatever the file says.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "budget-insight.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Answering behavior.
    #[serde(default)]
    pub insight: InsightSettings,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// How the general-insight fallback picks its answer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// Always the data snapshot (record count and fields)
    #[default]
    Snapshot,
    /// Always the help text with example questions
    Help,
    /// Pick one of the two at random on every call
    Sampled,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightSettings {
    #[serde(default)]
    pub fallback: FallbackMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address the API server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Seconds a session may sit idle before it ends; 0 keeps sessions
    /// until they are deleted.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_session_ttl_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing` filter directive, e.g. "info" or "budget_insight=debug".
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

impl InsightConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: InsightConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load from an explicit path, else from the default file if present,
    /// else built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Generate the default configuration file content.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&InsightConfig::default()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = InsightConfig::default();
        assert_eq!(config.insight.fallback, FallbackMode::Snapshot);
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(config.server.session_ttl_secs, 3600);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
[insight]
fallback = "sampled"

[logging]
level = "debug"
"#;

        let config: InsightConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.insight.fallback, FallbackMode::Sampled);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.server.bind, "0.0.0.0:3000");
    }

    #[test]
    fn test_default_toml_round_trips() {
        let toml_str = InsightConfig::default_toml();
        assert!(toml_str.contains("[insight]"));
        assert!(toml_str.contains("[server]"));

        let parsed: InsightConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, InsightConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbind = \"127.0.0.1:8080\"\nsession_ttl_secs = 600").unwrap();

        let config = InsightConfig::resolve(Some(file.path())).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.server.session_ttl_secs, 600);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = InsightConfig::resolve(Some(Path::new("/nonexistent/budget-insight.toml")));
        assert!(err.is_err());
    }
}
