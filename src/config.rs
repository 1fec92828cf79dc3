//! Configuration for simulation runs.
//!
//! Settings are read from YAML or JSON and validated on load.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! simulation:
//!   resolution: 64
//!   max_iterations: 32
//!   oscillation_limit: 4
//!   log_level: debug
//!   collect_stats: true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::clock::{Clock, DEFAULT_RESOLUTION};
use crate::evaluator::EvaluatorConfig;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Simulation parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Clock resolution, the default settle budget per phase
    #[serde(default = "default_resolution")]
    pub resolution: u32,

    /// Settle budget per phase, overriding the resolution
    #[serde(default)]
    pub max_iterations: Option<u32>,

    /// Consecutive oscillating cycles that abort a run
    #[serde(default)]
    pub oscillation_limit: Option<u32>,

    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to collect statistics
    #[serde(default)]
    pub collect_stats: bool,
}

fn default_resolution() -> u32 {
    DEFAULT_RESOLUTION
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            max_iterations: None,
            oscillation_limit: None,
            log_level: default_log_level(),
            collect_stats: false,
        }
    }
}

impl SimulationParams {
    /// Validates the parameters.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.resolution == 0 {
            return Err(ConfigError::Validation(
                "resolution must be positive".to_string(),
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(ConfigError::Validation(
                "max_iterations must be positive".to_string(),
            ));
        }
        if self.oscillation_limit == Some(0) {
            return Err(ConfigError::Validation(
                "oscillation_limit must be positive".to_string(),
            ));
        }
        if !matches!(
            self.log_level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        ) {
            tracing::warn!(
                "Log level {} is not a plain level, passing it to the filter as is",
                self.log_level
            );
        }
        Ok(())
    }
}

/// Complete simulation configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Simulation parameters
    #[serde(default)]
    pub simulation: SimulationParams,
}

impl SimConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.simulation.validate()
    }

    /// Converts to YAML string.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Converts to JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Saves configuration to a YAML file.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Saves configuration to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Evaluator settings.
    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            max_iterations: self.simulation.max_iterations,
            oscillation_limit: self.simulation.oscillation_limit,
        }
    }

    /// A fresh clock at cycle 0 with the configured resolution.
    pub fn clock(&self) -> Clock {
        Clock::new(self.simulation.resolution)
    }
}

/// Builder for creating SimConfig programmatically.
#[derive(Default)]
pub struct SimConfigBuilder {
    config: SimConfig,
}

impl SimConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the clock resolution.
    pub fn resolution(mut self, resolution: u32) -> Self {
        self.config.simulation.resolution = resolution;
        self
    }

    /// Sets the per-phase settle budget.
    pub fn max_iterations(mut self, max: u32) -> Self {
        self.config.simulation.max_iterations = Some(max);
        self
    }

    /// Sets the oscillation limit.
    pub fn oscillation_limit(mut self, limit: u32) -> Self {
        self.config.simulation.oscillation_limit = Some(limit);
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.simulation.log_level = level.into();
        self
    }

    /// Enables statistics collection.
    pub fn collect_stats(mut self, enable: bool) -> Self {
        self.config.simulation.collect_stats = enable;
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<SimConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::new();
        assert_eq!(config.simulation.resolution, 64);
        assert_eq!(config.simulation.max_iterations, None);
        assert_eq!(config.simulation.log_level, "info");
        assert!(!config.simulation.collect_stats);
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
simulation:
  resolution: 128
  max_iterations: 16
  oscillation_limit: 3
  log_level: debug
  collect_stats: true
"#;

        let config = SimConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.simulation.resolution, 128);
        assert_eq!(config.simulation.max_iterations, Some(16));
        assert_eq!(config.simulation.oscillation_limit, Some(3));
        assert_eq!(config.simulation.log_level, "debug");
        assert!(config.simulation.collect_stats);
    }

    #[test]
    fn test_json_parsing() {
        let json = r#"{
            "simulation": {
                "resolution": 32
            }
        }"#;

        let config = SimConfig::from_json(json).unwrap();
        assert_eq!(config.simulation.resolution, 32);
        assert_eq!(config.simulation.log_level, "info");
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = SimConfig::from_yaml("{}").unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = SimConfigBuilder::new()
            .resolution(10)
            .max_iterations(5)
            .oscillation_limit(2)
            .collect_stats(true)
            .build()
            .unwrap();

        assert_eq!(config.clock().resolution(), 10);
        assert_eq!(config.clock().cycle(), 0);
        assert_eq!(
            config.evaluator_config(),
            EvaluatorConfig::new()
                .with_max_iterations(5)
                .with_oscillation_limit(2)
        );
    }

    #[test]
    fn test_validation_zero_resolution() {
        let result = SimConfig::from_yaml("simulation:\n  resolution: 0\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validation_zero_limits() {
        assert!(SimConfigBuilder::new().max_iterations(0).build().is_err());
        assert!(SimConfigBuilder::new().oscillation_limit(0).build().is_err());
    }

    #[test]
    fn test_unknown_format() {
        let result = SimConfig::from_file("settings.toml");
        assert!(matches!(result, Err(ConfigError::UnknownFormat(ext)) if ext == "toml"));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = SimConfigBuilder::new()
            .resolution(16)
            .oscillation_limit(8)
            .build()
            .unwrap();

        let yaml = config.to_yaml().unwrap();
        let restored = SimConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config, restored);
    }
}
