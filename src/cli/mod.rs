//! Command-line interface module with topic help

pub mod help;

pub use help::HelpSystem;

use clap::Parser;
use std::path::PathBuf;

/// Relay Latency Prober - measure and rank TCP connect latency of relay endpoints
#[derive(Parser, Debug, Clone)]
#[command(name = "rlp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Endpoint list, one `<ipv4>,<port>[,<tag>...]` per line [default: proxy.txt]
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Result file, created or truncated [default: latencyresult.txt]
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Maximum number of probes in flight [default: 5]
    #[arg(short, long, value_name = "N", value_parser = parse_concurrency)]
    pub concurrency: Option<usize>,

    /// Number of rounds over all endpoints [default: 3]
    #[arg(short, long, value_name = "N", value_parser = parse_rounds)]
    pub rounds: Option<u32>,

    /// Per-probe connect timeout in seconds [default: 5]
    #[arg(short, long, value_name = "SECONDS", value_parser = parse_timeout)]
    pub timeout: Option<f64>,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Show help for specific topic (input, output, config, examples)
    #[arg(long, value_name = "TOPIC")]
    pub help_topic: Option<String>,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        Ok(())
    }

    /// Check if help should be displayed for a specific topic
    pub fn should_show_topic_help(&self) -> bool {
        self.help_topic.is_some()
    }

    /// Get the help topic if specified
    pub fn get_help_topic(&self) -> Option<&str> {
        self.help_topic.as_deref()
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }

    /// Display help for the specified topic or main help
    pub fn display_help(&self) -> String {
        let help_system = HelpSystem::new();
        let use_colors = self.use_colors();

        if let Some(topic) = &self.help_topic {
            help_system.display_topic_help(topic, use_colors).unwrap_or_else(|| {
                format!(
                    "Unknown help topic: '{}'\n\nAvailable topics: {}\n\n{}",
                    topic,
                    HelpSystem::TOPICS.join(", "),
                    help_system.display_main_help(use_colors)
                )
            })
        } else {
            help_system.display_main_help(use_colors)
        }
    }

    /// Get summary of the flags given on the command line
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Command-line Overrides:\n");
        if let Some(ref input) = self.input {
            summary.push_str(&format!("  Input file: {}\n", input.display()));
        }
        if let Some(ref output) = self.output {
            summary.push_str(&format!("  Output file: {}\n", output.display()));
        }
        if let Some(concurrency) = self.concurrency {
            summary.push_str(&format!("  Concurrency: {}\n", concurrency));
        }
        if let Some(rounds) = self.rounds {
            summary.push_str(&format!("  Rounds: {}\n", rounds));
        }
        if let Some(timeout) = self.timeout {
            summary.push_str(&format!("  Timeout: {}s\n", timeout));
        }
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));

        summary
    }
}

/// Parse a timeout in seconds, fractional values allowed
fn parse_timeout(s: &str) -> Result<f64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid timeout: {}", s));
    }

    let secs: f64 = s.parse().map_err(|_| format!("Invalid timeout: {}", s))?;
    if !secs.is_finite() {
        Err(format!("Invalid timeout: {}", s))
    } else if secs <= 0.0 {
        Err("Timeout must be greater than 0".to_string())
    } else if secs > crate::defaults::MAX_TIMEOUT_SECONDS {
        Err(format!(
            "Timeout cannot exceed {} seconds",
            crate::defaults::MAX_TIMEOUT_SECONDS
        ))
    } else {
        Ok(secs)
    }
}

fn parse_concurrency(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("Invalid concurrency: {}", s))?;
    if n == 0 {
        Err("Concurrency must be greater than 0".to_string())
    } else if n > crate::defaults::MAX_CONCURRENCY {
        Err(format!("Concurrency cannot exceed {}", crate::defaults::MAX_CONCURRENCY))
    } else {
        Ok(n)
    }
}

fn parse_rounds(s: &str) -> Result<u32, String> {
    let n: u32 = s.parse().map_err(|_| format!("Invalid round count: {}", s))?;
    if n == 0 {
        Err("Round count must be greater than 0".to_string())
    } else if n > crate::defaults::MAX_ROUNDS {
        Err(format!("Round count cannot exceed {}", crate::defaults::MAX_ROUNDS))
    } else {
        Ok(n)
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
