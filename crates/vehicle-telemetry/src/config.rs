//! Configuration management for vehicle-telemetry.
//!
//! Configuration is loaded with figment from built-in defaults and an
//! optional TOML file. Command-line flags are applied on top by the binary.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generator::{default_start, GenerationParams, Scenario};
use crate::vehicle::VehicleProfile;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name under the platform config directory.
const CONFIG_DIR_NAME: &str = "vehicle-telemetry";

/// Default dataset location, relative to the working directory.
const DEFAULT_DATASET_PATH: &str = "data/vehicle_telemetry.csv";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. TOML config file at `~/.config/vehicle-telemetry/config.toml`
/// 2. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generator configuration.
    pub generator: GeneratorConfig,
    /// Dataset file configuration.
    pub dataset: DatasetConfig,
    /// Simulated vehicle.
    pub vehicle: VehicleProfile,
}

/// Generator-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of weeks to generate.
    pub weeks: u32,
    /// Seconds between samples. Must divide one week.
    pub interval_secs: u32,
    /// Seed for reproducible output. Unseeded runs differ every time.
    pub seed: Option<u64>,
    /// Timestamp of the first sample.
    pub start: DateTime<Utc>,
    /// Fixed scenario for every week; drawn per week when unset.
    pub scenario: Option<Scenario>,
}

/// Dataset-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Where the dataset is written and read.
    pub path: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            weeks: params.weeks,
            interval_secs: params.interval_secs,
            seed: None,
            start: default_start(),
            scenario: None,
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATASET_PATH),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing file is not an error; defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the result is invalid.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] if any configuration values are
    /// invalid.
    pub fn validate(&self) -> Result<()> {
        let invalid = |err: Error| Error::ConfigValidation {
            message: err.to_string(),
        };

        self.generation_params().validate().map_err(invalid)?;
        self.vehicle.validate().map_err(invalid)?;

        if self.dataset.path.as_os_str().is_empty() {
            return Err(Error::ConfigValidation {
                message: "dataset.path must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Generation parameters described by the `[generator]` section.
    #[must_use]
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            weeks: self.generator.weeks,
            interval_secs: self.generator.interval_secs,
            start: self.generator.start,
            scenario: self.generator.scenario,
        }
    }

    /// The configured sampling interval.
    #[must_use]
    pub fn interval(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.generator.interval_secs))
    }
}
