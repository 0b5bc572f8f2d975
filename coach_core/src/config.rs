//! Configuration file support for repcoach.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/repcoach/config.toml`.
//! Every section is optional and falls back to defaults.

use crate::{Error, ExerciseProgress, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub goals: GoalsConfig,
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

/// Which collaborator implementation serves plans, exercises and sessions
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Library file plus on-disk session log under the data directory
    #[default]
    Local,
    /// Built-in library, sessions kept in memory for the process lifetime
    Memory,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,
}

/// Starting values for each exercise entry of a new session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_sets")]
    pub sets: u32,

    #[serde(default = "default_reps")]
    pub reps: u32,

    #[serde(default)]
    pub weight: f64,

    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sets: default_sets(),
            reps: default_reps(),
            weight: 0.0,
            rest_seconds: default_rest_seconds(),
        }
    }
}

impl SessionConfig {
    /// Progress entry every exercise of a new session starts from
    pub fn progress_template(&self) -> ExerciseProgress {
        ExerciseProgress {
            sets: self.sets.max(crate::progress::MIN_SETS),
            reps: self.reps.max(crate::progress::MIN_REPS),
            weight: self.weight.max(0.0),
            rest_time_seconds: self.rest_seconds,
            completed: false,
        }
    }
}

/// Training goals used by progress statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GoalsConfig {
    #[serde(default = "default_weekly_workouts")]
    pub weekly_workouts: u32,
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            weekly_workouts: default_weekly_workouts(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("repcoach")
}

fn default_sets() -> u32 {
    3
}

fn default_reps() -> u32 {
    10
}

fn default_rest_seconds() -> u32 {
    60
}

fn default_weekly_workouts() -> u32 {
    4
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
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

    /// Reject values that cannot produce a usable session
    pub fn validate(&self) -> Result<()> {
        if self.goals.weekly_workouts == 0 {
            return Err(Error::Config("goals.weekly_workouts must be at least 1".into()));
        }
        if !self.session.weight.is_finite() {
            return Err(Error::Config("session.weight must be a finite number".into()));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("repcoach").join("config.toml")
    }

    /// Save the configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
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
