//! Engine configuration
//!
//! TOML-backed settings for the pieces worth tuning without a recompile:
//! physics stepping, shadow cascades, and the initial viewport. Every field
//! has a default, so a partial file (or none at all) is fine.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::foundation::math::Vec3;

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML or has wrong types
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of its valid range
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Fixed-timestep physics settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// World gravity in meters per second squared
    pub gravity: Vec3,
    /// Length of one fixed substep in seconds
    pub fixed_timestep: f32,
    /// Substep cap per simulation step
    pub max_substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 16,
        }
    }
}

/// Shadow cascade settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Number of cascades per shadow-casting directional light
    pub cascade_count: usize,
    /// Shadow map resolution per cascade, in texels
    pub map_size: u32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            cascade_count: 4,
            map_size: 2048,
        }
    }
}

/// Initial framebuffer size
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Physics stepping settings
    pub physics: PhysicsConfig,
    /// Shadow cascade settings
    pub shadows: ShadowConfig,
    /// Initial viewport settings
    pub viewport: ViewportConfig,
}

impl EngineConfig {
    /// Parse a configuration from TOML text and validate it
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, validate it, and return it
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.physics.fixed_timestep <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "physics.fixed_timestep must be positive, got {}",
                self.physics.fixed_timestep
            )));
        }
        if self.physics.max_substeps == 0 {
            return Err(ConfigError::Invalid(
                "physics.max_substeps must be at least 1".into(),
            ));
        }
        if self.shadows.cascade_count == 0 {
            return Err(ConfigError::Invalid(
                "shadows.cascade_count must be at least 1".into(),
            ));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        Ok(())
    }
}
