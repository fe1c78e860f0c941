//! Environment variable handling, .env file management and proxy stripping

use crate::defaults;
use crate::error::{AppError, ErrorContext, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load an env file if it exists; variables already set are kept
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path).with_context(|| format!("Failed to load {}", path.display()))?;

            if debug {
                println!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            println!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Relay Latency Prober Configuration
#
# Values here are used as defaults and can be overridden by
# environment variables or command-line arguments.

# Endpoint list, one <ipv4>,<port>[,<tag>]* per line
# INPUT_FILE=proxy.txt

# Ranked result file (created or truncated)
# OUTPUT_FILE=latencyresult.txt

# Maximum number of probes in flight (1-1024)
# CONCURRENCY=5

# Number of rounds over all endpoints (1-100)
# ROUND_COUNT=3

# Connect timeout per probe in seconds, fractions allowed (max 300)
# TIMEOUT_SECONDS=5

# Enable colored output (true/false)
# ENABLE_COLOR=true

# Large lists on a fast link:
# CONCURRENCY=64
# TIMEOUT_SECONDS=1.5
"#
        .to_string()
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "INPUT_FILE" | "OUTPUT_FILE" => {
                if value.is_empty() {
                    return Err(AppError::config(format!("{} cannot be empty", key)));
                }
            }
            "CONCURRENCY" => {
                let concurrency: usize = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid CONCURRENCY value '{}': {}", value, e)))?;
                if concurrency == 0 || concurrency > defaults::MAX_CONCURRENCY {
                    return Err(AppError::config(format!(
                        "CONCURRENCY must be between 1 and {}, got: {}",
                        defaults::MAX_CONCURRENCY,
                        concurrency
                    )));
                }
            }
            "ROUND_COUNT" => {
                let rounds: u32 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid ROUND_COUNT value '{}': {}", value, e)))?;
                if rounds == 0 || rounds > defaults::MAX_ROUNDS {
                    return Err(AppError::config(format!(
                        "ROUND_COUNT must be between 1 and {}, got: {}",
                        defaults::MAX_ROUNDS,
                        rounds
                    )));
                }
            }
            "TIMEOUT_SECONDS" => {
                let timeout: f64 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid TIMEOUT_SECONDS value '{}': {}", value, e)))?;
                if !timeout.is_finite() || timeout <= 0.0 || timeout > defaults::MAX_TIMEOUT_SECONDS {
                    return Err(AppError::config(format!(
                        "TIMEOUT_SECONDS must be greater than 0 and at most {}, got: {}",
                        defaults::MAX_TIMEOUT_SECONDS,
                        value
                    )));
                }
            }
            "ENABLE_COLOR" => {
                value
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Supported environment variables as (name, description, example)
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("INPUT_FILE", "Endpoint list to probe", "proxy.txt"),
            ("OUTPUT_FILE", "Ranked result file", "latencyresult.txt"),
            ("CONCURRENCY", "Maximum probes in flight (1-1024)", "5"),
            ("ROUND_COUNT", "Rounds over all endpoints (1-100)", "3"),
            ("TIMEOUT_SECONDS", "Connect timeout per probe in seconds (max 300)", "5"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Check every supported variable that is set; the first bad one is an error
    pub fn validate_current_env() -> Result<()> {
        for (var_name, _, _) in Self::get_supported_env_vars() {
            if let Ok(value) = std::env::var(var_name) {
                Self::validate_env_var(var_name, &value)?;
            }
        }

        Ok(())
    }
}

/// Removes proxy settings from the process environment
///
/// Probes must connect directly to each endpoint. This runs once during
/// startup, before the async runtime and its worker threads exist.
pub struct ProxyEnvironment;

impl ProxyEnvironment {
    /// Proxy variables currently set in the environment
    pub fn active() -> Vec<&'static str> {
        defaults::PROXY_ENV_VARS
            .iter()
            .copied()
            .filter(|name| std::env::var_os(name).is_some())
            .collect()
    }

    /// Remove every proxy variable and return the names that were set
    pub fn disable() -> Vec<&'static str> {
        let removed = Self::active();
        for name in defaults::PROXY_ENV_VARS {
            std::env::remove_var(name);
        }
        removed
    }
}
