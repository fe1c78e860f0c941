//! Configuration data model and validation

use crate::defaults;
use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// File with one `<ipv4>,<port>[,<tag>]*` candidate per line
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,

    /// File receiving the ranked results
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Maximum number of probes executing at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Number of full passes over all endpoints
    #[serde(default = "default_rounds")]
    pub rounds: u32,

    /// Per-probe connect timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: f64,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_path: default_output_path(),
            concurrency: default_concurrency(),
            rounds: default_rounds(),
            timeout_seconds: default_timeout_secs(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds)
    }

    /// Validate the configuration and return the first error found
    pub fn validate(&self) -> Result<()> {
        if self.input_path.as_os_str().is_empty() {
            return Err(AppError::config("Input path cannot be empty"));
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(AppError::config("Output path cannot be empty"));
        }

        if self.concurrency == 0 {
            return Err(AppError::config("Concurrency must be greater than 0"));
        }

        if self.concurrency > defaults::MAX_CONCURRENCY {
            return Err(AppError::config(format!(
                "Concurrency cannot exceed {}",
                defaults::MAX_CONCURRENCY
            )));
        }

        if self.rounds == 0 {
            return Err(AppError::config("Round count must be greater than 0"));
        }

        if self.rounds > defaults::MAX_ROUNDS {
            return Err(AppError::config(format!("Round count cannot exceed {}", defaults::MAX_ROUNDS)));
        }

        if !self.timeout_seconds.is_finite() || self.timeout_seconds <= 0.0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > defaults::MAX_TIMEOUT_SECONDS {
            return Err(AppError::config(format!(
                "Timeout cannot exceed {} seconds",
                defaults::MAX_TIMEOUT_SECONDS
            )));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(input) = std::env::var("INPUT_FILE") {
            let input = input.trim();
            if !input.is_empty() {
                self.input_path = PathBuf::from(input);
            }
        }

        if let Ok(output) = std::env::var("OUTPUT_FILE") {
            let output = output.trim();
            if !output.is_empty() {
                self.output_path = PathBuf::from(output);
            }
        }

        if let Ok(concurrency) = std::env::var("CONCURRENCY") {
            self.concurrency = concurrency.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CONCURRENCY value '{}': {}", concurrency, e)))?;
        }

        if let Ok(rounds) = std::env::var("ROUND_COUNT") {
            self.rounds = rounds.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ROUND_COUNT value '{}': {}", rounds, e)))?;
        }

        if let Ok(timeout) = std::env::var("TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_input_path() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_INPUT_PATH)
}

fn default_output_path() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_OUTPUT_PATH)
}

fn default_concurrency() -> usize {
    defaults::DEFAULT_CONCURRENCY
}

fn default_rounds() -> u32 {
    defaults::DEFAULT_ROUNDS
}

fn default_timeout_secs() -> f64 {
    defaults::DEFAULT_TIMEOUT_SECONDS
}

fn default_enable_color() -> bool {
    defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.rounds, 3);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.input_path, PathBuf::from("proxy.txt"));
        assert_eq!(config.output_path, PathBuf::from("latencyresult.txt"));
    }

    #[test]
    fn test_zero_concurrency_invalid() {
        let mut config = Config::default();
        config.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_rounds_invalid() {
        let mut config = Config::default();
        config.rounds = 0;
        assert!(config.validate().is_err());
        config.rounds = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = Config::default();
        config.timeout_seconds = 0.0;
        assert!(config.validate().is_err());
        config.timeout_seconds = -1.0;
        assert!(config.validate().is_err());
        config.timeout_seconds = f64::NAN;
        assert!(config.validate().is_err());
        config.timeout_seconds = 300.5;
        assert!(config.validate().is_err());
        config.timeout_seconds = 0.25;
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_empty_paths_invalid() {
        let mut config = Config::default();
        config.input_path = PathBuf::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output_path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: Config = serde_json::from_str(r#"{"rounds": 7}"#).unwrap();
        assert_eq!(config.rounds, 7);
        assert_eq!(config.concurrency, defaults::DEFAULT_CONCURRENCY);
        assert!(!config.verbose);
    }
}
