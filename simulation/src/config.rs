//! TOML-backed simulation parameters.

use std::{fs, path::PathBuf};

use crystal_defence_world::WorldConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameters a simulation is created with.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Global seed for combat rolls, weather, spawn order, and wave shuffles.
    pub seed: u64,
    /// Seed of the generated path; falls back to `seed` when absent.
    pub path_seed: Option<u64>,
    /// Width of the playing field in world units.
    pub width: f32,
    /// Height of the playing field in world units.
    pub height: f32,
    /// Money available before the first placement.
    pub starting_money: u32,
    /// Lives available at the start.
    pub starting_lives: u32,
    /// Whether weather rotates during play.
    pub weather_enabled: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            seed: world.seed,
            path_seed: None,
            width: world.width,
            height: world.height,
            starting_money: world.starting_money,
            starting_lives: world.starting_lives,
            weather_enabled: world.weather_enabled,
        }
    }
}

impl SimulationConfig {
    /// Parses a configuration from TOML, filling omitted keys with defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let source = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Seed used to generate the path.
    #[must_use]
    pub fn path_seed(&self) -> u64 {
        self.path_seed.unwrap_or(self.seed)
    }

    pub(crate) fn world_config(&self) -> WorldConfig {
        WorldConfig {
            width: self.width,
            height: self.height,
            starting_money: self.starting_money,
            starting_lives: self.starting_lives,
            seed: self.seed,
            weather_enabled: self.weather_enabled,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let valid = |value: f32| value.is_finite() && value > 0.0;
        if !valid(self.width) || !valid(self.height) {
            return Err(ConfigError::InvalidField {
                width: self.width,
                height: self.height,
            });
        }
        if self.starting_lives == 0 {
            return Err(ConfigError::NoLives);
        }
        Ok(())
    }
}

/// Failures raised while loading a [`SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read configuration file {}", path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration was not valid TOML or had unexpected keys.
    #[error("could not parse configuration")]
    Parse(#[source] toml::de::Error),
    /// The field dimensions were not positive.
    #[error("field dimensions {width}x{height} must be positive")]
    InvalidField {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
    },
    /// The configuration granted no lives.
    #[error("starting lives must be at least one")]
    NoLives,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_keys_use_defaults() {
        let config = SimulationConfig::from_toml_str("seed = 42\nstarting_money = 300\n")
            .expect("valid configuration");
        assert_eq!(config.seed, 42);
        assert_eq!(config.starting_money, 300);
        assert_eq!(config.starting_lives, 10);
        assert_eq!(config.path_seed(), 42);
        assert!(config.weather_enabled);
    }

    #[test]
    fn explicit_path_seed_wins() {
        let config = SimulationConfig::from_toml_str("seed = 1\npath_seed = 77\n")
            .expect("valid configuration");
        assert_eq!(config.path_seed(), 77);
    }

    #[test]
    fn unknown_keys_and_bad_fields_are_rejected() {
        assert!(matches!(
            SimulationConfig::from_toml_str("sed = 1"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("width = 0.0"),
            Err(ConfigError::InvalidField { .. })
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("starting_lives = 0"),
            Err(ConfigError::NoLives)
        ));
    }

    #[test]
    fn missing_files_report_their_path() {
        let error = SimulationConfig::load("/nonexistent/crystal.toml").expect_err("missing file");
        assert!(error.to_string().contains("/nonexistent/crystal.toml"));
    }
}
