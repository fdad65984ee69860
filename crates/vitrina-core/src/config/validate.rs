//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{Config, ImageProcessingConfig, ThumbnailConfig, WatermarkConfig};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.image.validate()?;
        self.watermark.validate()?;
        self.thumbnail.validate()?;
        if self.limits.max_upload_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_upload_size_mb must be > 0".into(),
            ));
        }
        if self.limits.process_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.process_timeout_ms must be > 0".into(),
            ));
        }
        if self.processing.supported_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_extensions must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl ImageProcessingConfig {
    /// Check the merged per-call values before they reach the resizer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_width == 0 {
            return Err(ConfigError::ValidationError(
                "image.max_width must be > 0".into(),
            ));
        }
        if self.max_height == 0 {
            return Err(ConfigError::ValidationError(
                "image.max_height must be > 0".into(),
            ));
        }
        if self.quality > 100 {
            return Err(ConfigError::ValidationError(
                "image.quality must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}

impl WatermarkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // NaN fails both comparisons, so test for the valid range positively
        if !(self.size_percent > 0.0 && self.size_percent <= 100.0) {
            return Err(ConfigError::ValidationError(
                "watermark.size_percent must be in (0, 100]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ConfigError::ValidationError(
                "watermark.opacity must be between 0.0 and 1.0".into(),
            ));
        }
        Ok(())
    }
}

impl ThumbnailConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ValidationError(
                "thumbnail.width and thumbnail.height must be > 0".into(),
            ));
        }
        if self.quality > 100 {
            return Err(ConfigError::ValidationError(
                "thumbnail.quality must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}
