//! Configuration file support for HeavyDuty.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/heavyduty/config.toml`.
//! Every section and field is optional.

use crate::progression::DEFAULT_COMPLETION_THRESHOLD;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub progression: ProgressionConfig,

    #[serde(default)]
    pub nutrition: NutritionConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Progression parameters configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Share of planned exercises that makes a day count as completed
    #[serde(default = "default_completion_threshold")]
    pub completion_threshold: f64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            completion_threshold: default_completion_threshold(),
        }
    }
}

/// Calorie offsets applied to maintenance for the surplus/deficit goals
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NutritionConfig {
    #[serde(default = "default_surplus_kcal")]
    pub surplus_kcal: f64,

    #[serde(default = "default_deficit_kcal")]
    pub deficit_kcal: f64,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            surplus_kcal: default_surplus_kcal(),
            deficit_kcal: default_deficit_kcal(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("heavyduty")
}

fn default_completion_threshold() -> f64 {
    DEFAULT_COMPLETION_THRESHOLD
}

fn default_surplus_kcal() -> f64 {
    300.0
}

fn default_deficit_kcal() -> f64 {
    500.0
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("heavyduty")
            .join("config.toml")
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let t = self.progression.completion_threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(Error::Config(format!(
                "completion_threshold must be in (0, 1], got {}",
                t
            )));
        }
        for (name, value) in [
            ("surplus_kcal", self.nutrition.surplus_kcal),
            ("deficit_kcal", self.nutrition.deficit_kcal),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
