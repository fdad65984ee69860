//! Configuration management for Vitrina.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, and the `[image]`,
//! `[watermark]` and `[thumbnail]` sections are the base that per-call
//! overrides are merged onto.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Vitrina.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resize and encode defaults
    pub image: ImageProcessingConfig,

    /// Watermark defaults
    pub watermark: WatermarkConfig,

    /// Thumbnail defaults
    pub thumbnail: ThumbnailConfig,

    /// Upload ceiling and timeouts
    pub limits: LimitsConfig,

    /// Batch processing settings
    pub processing: ProcessingConfig,

    /// Local storage settings
    pub storage: StorageConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/es.vitrina.vitrina/config.toml
    /// - Linux: ~/.config/vitrina/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\vitrina\config\config.toml
    ///
    /// Falls back to ~/.vitrina/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("es", "vitrina", "vitrina")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".vitrina").join("config.toml")
            })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.image.max_width, 1920);
        assert_eq!(config.image.max_height, 1440);
        assert_eq!(config.image.quality, 85);
        assert_eq!(config.watermark.margin, 20);
        assert_eq!(config.watermark.position, WatermarkPosition::Southeast);
        assert_eq!(config.limits.max_upload_size_mb, 10);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[image]"));
        assert!(toml.contains("[watermark]"));
        assert!(toml.contains("position = \"southeast\""));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[image]\nquality = 70\n\n[watermark]\nposition = \"northwest\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.image.quality, 70);
        assert_eq!(config.image.max_width, 1920);
        assert_eq!(config.watermark.position, WatermarkPosition::Northwest);
        assert_eq!(config.watermark.opacity, 0.3);
    }

    #[test]
    fn test_load_rejects_out_of_range_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[watermark]\nopacity = 2.0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_load_rejects_unknown_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[watermark]\nposition = \"middle\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.image, config.image);
        assert_eq!(parsed.watermark, config.watermark);
    }
}
