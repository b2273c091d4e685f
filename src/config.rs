//! Composer Configuration
//!
//! Built once and handed to the pipeline. There is no process-wide default
//! state: every table the resolver reads lives in `FallbackDefaults`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::settings::FallbackDefaults;
use crate::{DEFAULT_MAX_PROMPT_LENGTH, ENGINE_VERSION, MIN_CONFIG_ENGINE_VERSION};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Config requires engine >= {0}, current is {1}")]
    EngineVersionMismatch(String, String),

    #[error("maxLength must be greater than zero")]
    InvalidMaxLength,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComposerConfig {
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_engine_min_version")]
    pub engine_min_version: String,
    #[serde(default)]
    pub fallbacks: FallbackDefaults,
}

fn default_max_length() -> usize { DEFAULT_MAX_PROMPT_LENGTH }
fn default_engine_min_version() -> String { MIN_CONFIG_ENGINE_VERSION.to_string() }

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            engine_min_version: default_engine_min_version(),
            fallbacks: FallbackDefaults::default(),
        }
    }
}

impl ComposerConfig {
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Load `path` when given, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if self.max_length == 0 {
            return Err(ConfigError::InvalidMaxLength);
        }

        let engine = semver::Version::parse(ENGINE_VERSION)
            .map_err(|_| ConfigError::InvalidVersion(ENGINE_VERSION.to_string()))?;
        let required = semver::Version::parse(&self.engine_min_version)
            .map_err(|_| ConfigError::InvalidVersion(self.engine_min_version.clone()))?;

        if engine < required {
            return Err(ConfigError::EngineVersionMismatch(
                self.engine_min_version.clone(),
                ENGINE_VERSION.to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = ComposerConfig::from_json("{}").unwrap();
        assert_eq!(config, ComposerConfig::default());
        assert_eq!(config.max_length, 4000);
    }

    #[test]
    fn test_partial_fallback_override() {
        let config = ComposerConfig::from_json(
            r#"{"maxLength": 3500, "fallbacks": {"defaultLighting": "north light"}}"#,
        )
        .unwrap();
        assert_eq!(config.max_length, 3500);
        assert_eq!(config.fallbacks.default_lighting, "north light");
        assert!(!config.fallbacks.style_by_category.is_empty());
    }

    #[test]
    fn test_engine_gate() {
        let err = ComposerConfig::from_json(r#"{"engineMinVersion": "99.0.0"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EngineVersionMismatch(..)));

        let err = ComposerConfig::from_json(r#"{"engineMinVersion": "one"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVersion(_)));
    }

    #[test]
    fn test_zero_max_length_rejected() {
        let err = ComposerConfig::from_json(r#"{"maxLength": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMaxLength));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"maxLength": 2500}}"#).unwrap();
        let config = ComposerConfig::load(file.path()).unwrap();
        assert_eq!(config.max_length, 2500);

        let missing = ComposerConfig::load(Path::new("/nonexistent/forgeprompts.json"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
