//! Configuration loading for the simulation.
//!
//! Settings come from a TOML file (`courier.toml` by default). Every section
//! and field is optional; missing values fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::components::MAX_DIMENSION;
use crate::rng::RngKind;

pub const DEFAULT_CONFIG_PATH: &str = "courier.toml";

/// Complete simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        content.parse()
    }

    /// Like [`SimConfig::from_file`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks every bound the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let map = &self.map;
        if map.width <= 0 || map.height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "map must be at least 1x1, got {}x{}",
                map.width, map.height
            )));
        }
        if map.width > MAX_DIMENSION || map.height > MAX_DIMENSION {
            return Err(ConfigError::Invalid(format!(
                "map sides are capped at {MAX_DIMENSION}, got {}x{}",
                map.width, map.height
            )));
        }
        if map.safe_zone_width <= 0 || map.safe_zone_height <= 0 {
            return Err(ConfigError::Invalid("safe zone blocks must be at least 1x1".into()));
        }
        if map.safe_zone_width > map.width / 2 || map.safe_zone_height > map.height / 2 {
            return Err(ConfigError::Invalid(format!(
                "safe zone blocks of {}x{} overlap on a {}x{} map",
                map.safe_zone_width, map.safe_zone_height, map.width, map.height
            )));
        }
        if !(0.0..1.0).contains(&map.obstacle_density) {
            return Err(ConfigError::Invalid(format!(
                "obstacle_density must be in [0, 1), got {}",
                map.obstacle_density
            )));
        }
        if map.max_placement_attempts == 0 {
            return Err(ConfigError::Invalid("max_placement_attempts must be positive".into()));
        }
        if self.run.max_steps == 0 {
            return Err(ConfigError::Invalid("max_steps must be positive".into()));
        }
        if self.population.initial_energy == 0 {
            return Err(ConfigError::Invalid("initial_energy must be positive".into()));
        }
        if self.population.max_messages_per_agent == 0 {
            return Err(ConfigError::Invalid("max_messages_per_agent must be positive".into()));
        }
        Ok(())
    }
}

impl std::str::FromStr for SimConfig {
    type Err = ConfigError;

    /// Parses and validates configuration from a TOML string.
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

/// Map size, obstacles and safe zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: i32,
    pub height: i32,
    /// Fraction of all tiles turned into obstacles
    pub obstacle_density: f64,
    pub safe_zone_width: i32,
    pub safe_zone_height: i32,
    /// Cap on rejection-sampling tries per placement
    pub max_placement_attempts: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 14,
            height: 8,
            obstacle_density: 0.04,
            safe_zone_width: 3,
            safe_zone_height: 2,
            max_placement_attempts: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub agents_per_faction: u32,
    pub initial_energy: u32,
    pub max_messages_per_agent: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            agents_per_faction: 2,
            initial_energy: 100,
            max_messages_per_agent: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Round budget before the most-messages verdict
    pub max_steps: u64,
    /// Pause between rounds
    pub step_delay_ms: u64,
    /// Fixed seed; the wall clock seeds the run when absent
    pub seed: Option<u64>,
    pub rng: RngKind,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: 50,
            step_delay_ms: 0,
            seed: None,
            rng: RngKind::MonteCarlo,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Print Master tallies after every round
    pub verbose: bool,
    /// Draw the map after every round
    pub render: bool,
    /// Paint the map with ANSI faction colours
    pub color: bool,
    /// JSONL event log destination
    pub events_path: Option<PathBuf>,
    /// Final snapshot and verdict destination
    pub summary_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
