//! Configuration parsing from CLI arguments and environment variables

use crate::{cli::Cli, config::env::EnvManager, error::Result, models::Config};
use std::path::PathBuf;

/// Configuration parser that layers defaults, .env, environment and CLI
pub struct ConfigParser {
    cli: Cli,
    env_file: PathBuf,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            env_file: PathBuf::from(".env"),
        }
    }

    /// Read a different env file instead of `./.env`
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = path.into();
        self
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        // .env never overrides variables that are already set
        EnvManager::load_env_file_from(&self.env_file, self.cli.debug)?;
        EnvManager::validate_current_env()?;

        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(ref input) = self.cli.input {
            config.input_path = input.clone();
        }

        if let Some(ref output) = self.cli.output {
            config.output_path = output.clone();
        }

        if let Some(concurrency) = self.cli.concurrency {
            config.concurrency = concurrency;
        }

        if let Some(rounds) = self.cli.rounds {
            config.rounds = rounds;
        }

        if let Some(timeout) = self.cli.timeout {
            config.timeout_seconds = timeout;
        }

        if self.cli.color {
            config.enable_color = true;
        }

        if self.cli.no_color {
            config.enable_color = false;
        }

        // CLI-only flags
        config.verbose = self.cli.verbose || self.cli.debug;
        config.debug = self.cli.debug;

        if config.debug {
            println!("Applied CLI overrides to configuration");
            println!(
                "Final config: concurrency={}, rounds={}, timeout={}s, enable_color={}",
                config.concurrency, config.rounds, config.timeout_seconds, config.enable_color
            );
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Input File: {}", config.input_path.display()));
    summary.push(format!("Output File: {}", config.output_path.display()));
    summary.push(format!("Concurrency: {}", config.concurrency));
    summary.push(format!("Rounds: {}", config.rounds));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
