//! Configuration validation utilities and rules

use crate::{error::Result, models::Config};
use colored::*;

/// Configuration validator producing non-fatal warnings
pub struct ConfigValidator;

/// Concurrency above this is allowed but often saturates local sockets
pub const HIGH_CONCURRENCY: usize = 256;

/// Timeouts below this mostly measure the timer, not the network
pub const SHORT_TIMEOUT_SECONDS: f64 = 0.1;

pub const MANY_ROUNDS: u32 = 20;

impl ConfigValidator {
    /// Run `Config::validate`, then collect warnings for suspicious settings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_paths(config));
        warnings.extend(Self::validate_performance_settings(config));

        Ok(warnings)
    }

    fn validate_paths(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.input_path == config.output_path {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Output path '{}' is the input file; it will be overwritten with results",
                    config.output_path.display()
                ),
            ));
        }

        if config.output_path.is_dir() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Output path '{}' is a directory", config.output_path.display()),
            ));
        }

        warnings
    }

    fn validate_performance_settings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.concurrency > HIGH_CONCURRENCY {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Concurrency of {} may exhaust local ports or file descriptors and distort latencies",
                    config.concurrency
                ),
            ));
        }

        if config.timeout_seconds < SHORT_TIMEOUT_SECONDS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Timeout of {}s is shorter than most round trips; expect many failures",
                    config.timeout_seconds
                ),
            ));
        }

        if config.rounds > MANY_ROUNDS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("{} rounds will take a while; each round probes every endpoint", config.rounds),
            ));
        }

        if config.rounds == 1 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "A single round ranks by one measurement per endpoint".to_string(),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Blue,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
