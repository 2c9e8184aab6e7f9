//! Configuration.
//!
//! All settings are plain serde structs with defaults, loadable from JSON.
//! Missing fields fall back to their defaults, so a config file only needs to
//! name what it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::Quality;
use crate::format::{FormatTag, DEFAULT_QUALITY};
use crate::resize::ResizeConfig;

/// Lowest processing intensity.
pub const MIN_INTENSITY: u8 = 1;
/// Highest processing intensity.
pub const MAX_INTENSITY: u8 = 12;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Worker pool sizing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Upper bound on execution units.
    pub max_pool_size: usize,
    /// Intensity at or above which the pool grows past one unit.
    pub intensity_threshold: u8,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_pool_size: 4,
            intensity_threshold: 3,
        }
    }
}

/// Default quality per target format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityDefaults {
    pub avif: u8,
    pub jpeg: u8,
    pub jxl: u8,
    pub png: u8,
    pub webp: u8,
}

impl Default for QualityDefaults {
    fn default() -> Self {
        Self {
            avif: DEFAULT_QUALITY,
            jpeg: DEFAULT_QUALITY,
            jxl: DEFAULT_QUALITY,
            png: DEFAULT_QUALITY,
            webp: DEFAULT_QUALITY,
        }
    }
}

impl QualityDefaults {
    /// Quality configured for `format`.
    pub fn for_format(&self, format: FormatTag) -> u8 {
        match format {
            FormatTag::Avif => self.avif,
            FormatTag::Jpeg => self.jpeg,
            FormatTag::Jxl => self.jxl,
            FormatTag::Png => self.png,
            FormatTag::Webp => self.webp,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquashConfig {
    /// Processing intensity, 1 (light) to 12 (aggressive).
    pub intensity: u8,
    pub pool: PoolConfig,
    pub quality: QualityDefaults,
    pub resize: ResizeConfig,
}

impl Default for SquashConfig {
    fn default() -> Self {
        Self {
            intensity: 4,
            pool: PoolConfig::default(),
            quality: QualityDefaults::default(),
            resize: ResizeConfig::default(),
        }
    }
}

impl SquashConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SquashConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_INTENSITY..=MAX_INTENSITY).contains(&self.intensity) {
            return Err(ConfigError::Invalid(format!(
                "intensity must be between {} and {}, got {}",
                MIN_INTENSITY, MAX_INTENSITY, self.intensity
            )));
        }

        if self.pool.max_pool_size == 0 {
            return Err(ConfigError::Invalid(
                "pool.max_pool_size must be at least 1".to_string(),
            ));
        }

        for format in FormatTag::ALL {
            let value = self.quality.for_format(format);
            if Quality::new(value).is_err() {
                return Err(ConfigError::Invalid(format!(
                    "quality.{} must be between {} and {}, got {}",
                    format,
                    Quality::MIN,
                    Quality::MAX,
                    value
                )));
            }
        }
        Ok(())
    }
}
