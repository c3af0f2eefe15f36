//! Repository configuration
//!
//! A repository may carry an optional config file in its root scope. Every field is
//! optional and a repository without one runs on defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::output::ColorChoice;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read config file {path}: {source}")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("Unable to parse YAML config file {path}: {source}")]
    Yaml {
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("Unable to parse JSON config file {path}: {source}")]
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },
}

/// Shell used for sourced scripts when the config does not name one.
pub const DEFAULT_SHELL: &str = "sh";

/// Repository-level settings
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Shell that sources `*`-bound scripts
    pub shell: Option<String>,
    pub color: Option<ColorChoice>,
    /// Extra variables for every invoked script
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// List of supported configuration file names, looked up inside the root scope
const FILENAMES: [&str; 3] = [".mango.json", ".mango.yaml", ".mango.yml"];

impl Config {
    /// Loads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, or
    /// `ConfigError::Yaml`/`ConfigError::Json` if parsing fails.
    pub fn from_file(file: &Path) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(file).map_err(|e| ConfigError::Io {
            source: e,
            path: file.to_path_buf(),
        })?;
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = if file.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&contents).map_err(|e| ConfigError::Json {
                source: e,
                path: file.to_path_buf(),
            })?
        } else {
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::Yaml {
                source: e,
                path: file.to_path_buf(),
            })?
        };
        Ok(config)
    }

    /// Loads the config of the root scope `scope`, or the defaults if it has none.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a config file exists but cannot be read or parsed.
    pub fn load(scope: &Path) -> Result<Config, ConfigError> {
        for file in &FILENAMES {
            let path = scope.join(file);
            if path.is_file() {
                info!("Found config file: {}", path.display());
                return Config::from_file(&path);
            }
        }
        debug!("No config file in {}, using defaults", scope.display());
        Ok(Config::default())
    }

    #[must_use]
    pub fn shell(&self) -> &str {
        self.shell.as_deref().unwrap_or(DEFAULT_SHELL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.shell(), DEFAULT_SHELL);
    }

    #[test]
    fn test_from_file_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".mango.yaml"),
            "shell: bash\ncolor: never\nenv:\n  STAGE: dev\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.shell(), "bash");
        assert_eq!(config.color, Some(ColorChoice::Never));
        assert_eq!(config.env.get("STAGE").map(String::as_str), Some("dev"));
    }

    #[test]
    fn test_from_file_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".mango.json");
        std::fs::write(&path, r#"{"color": "always"}"#).unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.color, Some(ColorChoice::Always));
        assert!(config.env.is_empty());
    }

    #[test]
    fn test_json_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".mango.json"), r#"{"shell": "zsh"}"#).unwrap();
        std::fs::write(dir.path().join(".mango.yaml"), "shell: bash\n").unwrap();
        assert_eq!(Config::load(dir.path()).unwrap().shell(), "zsh");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".mango.yml");
        std::fs::write(&path, "colour: never\n").unwrap();
        match Config::from_file(&path) {
            Err(ConfigError::Yaml { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected ConfigError::Yaml, got: {other:?}"),
        }
    }
}
