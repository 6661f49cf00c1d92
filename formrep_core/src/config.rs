//! Configuration file support for formrep.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/formrep/config.toml`.

use crate::geometry::DEFAULT_STABILITY_THRESHOLD;
use crate::{Error, ExerciseKind, FitnessLevel, Result, DEFAULT_WORKOUT_MINUTES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub counter: CounterSettings,

    #[serde(default)]
    pub calories: CalorieConfig,
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

/// Scheduling defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: u32,

    #[serde(default)]
    pub fitness_level: FitnessLevel,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: default_duration_minutes(),
            fitness_level: FitnessLevel::default(),
        }
    }
}

/// Frame filtering applied when replaying pose streams
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CounterSettings {
    #[serde(default)]
    pub skip_unstable_frames: bool,

    #[serde(default = "default_stability_threshold")]
    pub stability_threshold: f64,
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self {
            skip_unstable_frames: false,
            stability_threshold: default_stability_threshold(),
        }
    }
}

/// Estimated kcal burned per repetition
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalorieConfig {
    #[serde(default = "default_bicep_curl_kcal")]
    pub bicep_curl: f64,

    #[serde(default = "default_push_up_kcal")]
    pub push_up: f64,

    #[serde(default = "default_squat_kcal")]
    pub squat: f64,
}

impl Default for CalorieConfig {
    fn default() -> Self {
        Self {
            bicep_curl: default_bicep_curl_kcal(),
            push_up: default_push_up_kcal(),
            squat: default_squat_kcal(),
        }
    }
}

impl CalorieConfig {
    pub fn per_rep(&self, exercise: ExerciseKind) -> f64 {
        match exercise {
            ExerciseKind::BicepCurl => self.bicep_curl,
            ExerciseKind::PushUp => self.push_up,
            ExerciseKind::Squat => self.squat,
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("formrep")
}

fn default_duration_minutes() -> u32 {
    DEFAULT_WORKOUT_MINUTES
}

fn default_stability_threshold() -> f64 {
    DEFAULT_STABILITY_THRESHOLD
}

fn default_bicep_curl_kcal() -> f64 {
    0.4
}

fn default_push_up_kcal() -> f64 {
    0.5
}

fn default_squat_kcal() -> f64 {
    0.45
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
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

    /// Reject values the engines cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.schedule.default_duration_minutes == 0 {
            return Err(Error::Config(
                "schedule.default_duration_minutes must be positive".into(),
            ));
        }
        if !(self.counter.stability_threshold > 0.0) {
            return Err(Error::Config(
                "counter.stability_threshold must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("formrep").join("config.toml")
    }

    /// Save the current configuration to a specific path
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
