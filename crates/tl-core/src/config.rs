//! Configuration management for threadline

use crate::age::RelativeAge;
use crate::error::{Result, ThreadlineError};
use crate::thread::OrphanPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database settings
    pub storage: StorageConfig,
    /// Query settings
    pub fetch: FetchConfig,
    /// Retention windows
    pub retention: RetentionConfig,
    /// Input validation limits
    pub validation: ValidationConfig,
    /// Thread building
    pub thread: ThreadConfig,
}

impl Config {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| ThreadlineError::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ThreadlineError::Io(e).with_context(format!("Failed to read {:?}", path)))?;
        Self::from_toml_str(&content)
    }

    /// Serialize to pretty TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ThreadlineError::Toml(e.to_string()))
    }

    /// Check limits that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.fetch.default_limit == 0 {
            return Err(ThreadlineError::Config(
                "fetch.default_limit must be positive".to_string(),
            ));
        }
        if self.validation.max_message_length == 0 {
            return Err(ThreadlineError::Config(
                "validation.max_message_length must be positive".to_string(),
            ));
        }
        if self.thread.max_depth == 0 {
            return Err(ThreadlineError::Config(
                "thread.max_depth must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,
    /// Create the database file when it does not exist
    pub create_if_missing: bool,
}

impl StorageConfig {
    /// Platform data directory for the database
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "threadline", "threadline")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".threadline")
            })
            .join("comments.db")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            create_if_missing: true,
        }
    }
}

/// Query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum number of comments fetched for a post
    pub default_limit: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { default_limit: 100 }
    }
}

/// Retention windows for the bulk removal operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Window used when removing recent comments
    pub newer_than: RelativeAge,
    /// Window used when removing old comments
    pub older_than: RelativeAge,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            newer_than: RelativeAge::default_newer(),
            older_than: RelativeAge::default_older(),
        }
    }
}

/// Input validation limits, in characters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub max_username_length: usize,
    pub max_ip_length: usize,
    pub max_message_length: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_username_length: 80,
            max_ip_length: 50,
            max_message_length: 10000,
        }
    }
}

/// Thread building configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    /// What to do with comments whose parent is missing
    pub orphans: OrphanPolicy,
    /// Deepest nesting level that is still attached
    pub max_depth: usize,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            orphans: OrphanPolicy::Drop,
            max_depth: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.storage.create_if_missing);
        assert!(config.storage.path.ends_with("comments.db"));
        assert_eq!(config.fetch.default_limit, 100);
        assert_eq!(config.retention.newer_than.to_string(), "1 day");
        assert_eq!(config.retention.older_than.to_string(), "6 months");
        assert_eq!(config.validation.max_username_length, 80);
        assert_eq!(config.thread.orphans, OrphanPolicy::Drop);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = config.to_toml_string().unwrap();
        assert!(toml.contains("[storage]"));
        assert!(toml.contains("[retention]"));
        assert!(toml.contains("older_than = \"6 months\""));

        let config2 = Config::from_toml_str(&toml).unwrap();
        assert_eq!(config.fetch.default_limit, config2.fetch.default_limit);
        assert_eq!(config.retention.older_than, config2.retention.older_than);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml_str(
            r#"
            [retention]
            older_than = "1 year"

            [thread]
            orphans = "promote"
            "#,
        )
        .unwrap();

        assert_eq!(config.retention.older_than.to_string(), "1 year");
        assert_eq!(config.retention.newer_than.to_string(), "1 day");
        assert_eq!(config.thread.orphans, OrphanPolicy::Promote);
        assert_eq!(config.thread.max_depth, 256);
    }

    #[test]
    fn test_invalid_config() {
        assert!(Config::from_toml_str("[retention]\nnewer_than = \"whenever\"").is_err());
        assert!(Config::from_toml_str("[fetch]\ndefault_limit = 0").is_err());
        assert!(Config::from_toml_str("[thread]\nmax_depth = 0").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[storage]\npath = \"/tmp/blog.db\"\ncreate_if_missing = false").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.storage.path, PathBuf::from("/tmp/blog.db"));
        assert!(!config.storage.create_if_missing);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
