//! Command-line help system with examples and topic references
//!
//! The main help mirrors the clap options with longer descriptions, and
//! `--help-topic` selects a detailed reference for input files, output
//! files, configuration or usage examples.

use crate::{config::env::EnvManager, defaults};
use colored::*;

/// Help text renderer for the CLI application
pub struct HelpSystem {
    platform: String,
}

impl HelpSystem {
    /// Topics accepted by `--help-topic`
    pub const TOPICS: &'static [&'static str] = &["input", "output", "config", "examples"];

    /// Create a new help system
    pub fn new() -> Self {
        Self {
            platform: platform_name(),
        }
    }

    /// Display the main help message with all available options
    pub fn display_main_help(&self, use_colors: bool) -> String {
        let mut help = String::new();

        help.push_str(&self.format_header(use_colors));
        help.push('\n');
        help.push_str(&self.format_usage_section(use_colors));
        help.push('\n');
        help.push_str(&self.format_options_section(use_colors));
        help.push('\n');
        help.push_str(&self.format_examples_section(use_colors));
        help.push('\n');
        help.push_str(&self.format_environment_section(use_colors));
        help.push('\n');
        help.push_str(&self.format_footer(use_colors));

        help
    }

    /// Display detailed help for one topic, `None` for unknown topics
    pub fn display_topic_help(&self, topic: &str, use_colors: bool) -> Option<String> {
        match topic.to_lowercase().as_str() {
            "input" | "proxy" => Some(self.format_input_help(use_colors)),
            "output" | "results" => Some(self.format_output_help(use_colors)),
            "config" | "configuration" | "env" | "environment" => {
                Some(self.format_configuration_help(use_colors))
            }
            "examples" => Some(self.format_examples_section(use_colors)),
            _ => None,
        }
    }

    fn section_header(&self, title: &str, use_colors: bool) -> String {
        if use_colors {
            title.bright_green().bold().to_string()
        } else {
            title.to_string()
        }
    }

    fn format_header(&self, use_colors: bool) -> String {
        let title = "Relay Latency Prober";
        let subtitle = "Measures TCP connect latency of relay endpoints and ranks them by worst case";
        let version = env!("CARGO_PKG_VERSION");

        if use_colors {
            format!(
                "{}\n{}\nVersion: {} | Platform: {}\n",
                title.bright_cyan().bold(),
                subtitle.bright_blue(),
                version.green(),
                self.platform.yellow()
            )
        } else {
            format!(
                "{}\n{}\nVersion: {} | Platform: {}\n",
                title, subtitle, version, self.platform
            )
        }
    }

    fn format_usage_section(&self, use_colors: bool) -> String {
        let usage_patterns = [
            "rlp [OPTIONS]",
            "rlp -i <PATH> -o <PATH> [OPTIONS]",
            "rlp --help-topic <TOPIC>",
        ];

        let mut usage = format!("{}\n", self.section_header("USAGE:", use_colors));
        for pattern in usage_patterns {
            if use_colors {
                usage.push_str(&format!("  {}\n", pattern.bright_white()));
            } else {
                usage.push_str(&format!("  {}\n", pattern));
            }
        }

        usage
    }

    fn format_options_section(&self, use_colors: bool) -> String {
        let options = [
            OptionHelp {
                short: Some("i"),
                long: "input",
                value: "<PATH>",
                description: "Endpoint list to probe (default: proxy.txt)",
                example: Some("--input relays.txt"),
            },
            OptionHelp {
                short: Some("o"),
                long: "output",
                value: "<PATH>",
                description: "Ranked result file (default: latencyresult.txt)",
                example: None,
            },
            OptionHelp {
                short: Some("c"),
                long: "concurrency",
                value: "<N>",
                description: "Probes in flight at once, 1-1024 (default: 5)",
                example: Some("--concurrency 32"),
            },
            OptionHelp {
                short: Some("r"),
                long: "rounds",
                value: "<N>",
                description: "Passes over all endpoints, 1-100 (default: 3)",
                example: None,
            },
            OptionHelp {
                short: Some("t"),
                long: "timeout",
                value: "<SECONDS>",
                description: "Connect timeout per probe, fractions allowed (default: 5)",
                example: Some("--timeout 1.5"),
            },
            OptionHelp {
                short: None,
                long: "color",
                value: "",
                description: "Force colored output",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "no-color",
                value: "",
                description: "Disable colored output",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "verbose",
                value: "",
                description: "Show per-round timings, failure breakdown and top endpoints",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "debug",
                value: "",
                description: "Log every probe as JSON with source locations",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "help-topic",
                value: "<TOPIC>",
                description: "Detailed help: input, output, config, examples",
                example: Some("--help-topic input"),
            },
        ];

        let mut output = format!("{}\n", self.section_header("OPTIONS:", use_colors));
        for option in options {
            output.push_str(&option.format(use_colors));
            output.push('\n');
        }

        output
    }

    fn format_examples_section(&self, use_colors: bool) -> String {
        let examples = [
            ExampleHelp {
                title: "Probe proxy.txt with defaults",
                command: "rlp",
                description: "Three rounds, five probes in flight, results in latencyresult.txt",
            },
            ExampleHelp {
                title: "Large list with a short timeout",
                command: "rlp -i relays.txt -c 64 -t 1.5",
                description: "Probe 64 endpoints at a time and give up on each after 1.5 seconds",
            },
            ExampleHelp {
                title: "More rounds for a stable ranking",
                command: "rlp --rounds 10 --output ranked.txt",
                description: "Rank by the worst of ten measurements per endpoint",
            },
            ExampleHelp {
                title: "Plain output for scripts",
                command: "rlp --no-color --verbose > run.log",
                description: "No ANSI colors, with the run summary and failure breakdown",
            },
            ExampleHelp {
                title: "Configuration from the environment",
                command: "CONCURRENCY=20 ROUND_COUNT=5 rlp",
                description: "Same as -c 20 -r 5; flags still win over variables",
            },
        ];

        let mut output = format!("{}\n", self.section_header("EXAMPLES:", use_colors));
        for example in examples {
            output.push_str(&example.format(use_colors));
            output.push('\n');
        }

        output
    }

    fn format_environment_section(&self, use_colors: bool) -> String {
        let mut output = format!("{}\n", self.section_header("ENVIRONMENT VARIABLES:", use_colors));
        output.push_str("Configuration priority: CLI arguments > Environment variables > .env file > Defaults\n\n");

        for (var_name, description, _example) in EnvManager::get_supported_env_vars() {
            if use_colors {
                output.push_str(&format!("  {}: {}\n", var_name.bright_yellow().bold(), description.white()));
            } else {
                output.push_str(&format!("  {}: {}\n", var_name, description));
            }
        }

        output.push_str(&format!(
            "\nProxy variables ({}) are removed before probing.\n",
            defaults::PROXY_ENV_VARS.join(", ")
        ));

        output
    }

    fn format_footer(&self, use_colors: bool) -> String {
        let mut footer = format!("{}\n", self.section_header("ADDITIONAL HELP:", use_colors));

        let help_topics = [
            ("--help-topic input", "Endpoint list format and validation rules"),
            ("--help-topic output", "Result file format and ranking"),
            ("--help-topic config", "Environment variables and .env file"),
            ("--help-topic examples", "Usage examples"),
        ];

        for (command, description) in help_topics {
            if use_colors {
                footer.push_str(&format!("  {}: {}\n", command.bright_yellow(), description.white()));
            } else {
                footer.push_str(&format!("  {}: {}\n", command, description));
            }
        }

        footer
    }

    fn format_input_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", self.section_header("INPUT FILE REFERENCE:", use_colors));

        help.push_str("LINE FORMAT:\n");
        help.push_str("  <ipv4>,<port>[,<tag>]*\n\n");
        help.push_str("  1.1.1.1,443,US,CF\n");
        help.push_str("  9.9.9.9,999,Quad9\n");
        help.push_str("  010.001.001.001, 8443 , HK , Relay 2\n\n");

        help.push_str("VALIDATION RULES:\n");
        help.push_str("- Fields are comma-separated; whitespace around each field is ignored\n");
        help.push_str("- The address has four dot-separated decimal parts of 1-3 digits, each 0-255\n");
        help.push_str("- Leading zeros are accepted and the address text is kept as written\n");
        help.push_str("- The port is a decimal integer from 1 to 65535\n");
        help.push_str("- Everything after the port is an ordered list of tags\n\n");

        help.push_str("SKIPPED LINES:\n");
        help.push_str("- Blank lines are ignored\n");
        help.push_str("- Invalid lines are reported with their line number and reason\n");
        help.push_str("- A line identical to an earlier one is probed only once\n");
        help.push_str("- A file without any valid line ends the run with exit code 1\n");

        help
    }

    fn format_output_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", self.section_header("OUTPUT FILE REFERENCE:", use_colors));

        help.push_str("LINE FORMAT:\n");
        help.push_str("  <ip>:<port>#<tags joined by spaces> <latency>\n\n");
        help.push_str("  9.9.9.9:999#Quad9 6.00 ms\n");
        help.push_str("  1.1.1.1:443#US CF 20.00 ms\n");
        help.push_str("  8.8.8.8:53#US Google Failed\n\n");

        help.push_str("RANKING:\n");
        help.push_str("- Each endpoint is represented by its worst successful latency\n");
        help.push_str("- Endpoints without any successful probe are written as Failed, last\n");
        help.push_str("- Endpoints with equal latency keep their input order\n");
        help.push_str("- The file is created or truncated on every run\n\n");

        help.push_str("CONSOLE PROGRESS:\n");
        if use_colors {
            help.push_str(&format!("- {}: < 50ms\n", "Green".green()));
            help.push_str(&format!("- {}: 50-150ms\n", "Cyan".cyan()));
            help.push_str(&format!("- {}: 150-300ms\n", "Yellow".yellow()));
            help.push_str(&format!("- {}: 300-1000ms\n", "Magenta".magenta()));
            help.push_str(&format!("- {}: >= 1000ms or Failed\n", "Red".red()));
        } else {
            help.push_str("- Green: < 50ms\n");
            help.push_str("- Cyan: 50-150ms\n");
            help.push_str("- Yellow: 150-300ms\n");
            help.push_str("- Magenta: 300-1000ms\n");
            help.push_str("- Red: >= 1000ms or Failed\n");
        }

        help.push_str("\nCtrl-C stops probing; results gathered so far are still written.\n");

        help
    }

    fn format_configuration_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", self.section_header("CONFIGURATION REFERENCE:", use_colors));

        help.push_str("CONFIGURATION PRIORITY (highest to lowest):\n");
        help.push_str("1. Command-line arguments\n");
        help.push_str("2. Environment variables\n");
        help.push_str("3. .env file in the current directory\n");
        help.push_str("4. Default values\n\n");

        help.push_str("PARAMETER LIMITS:\n");
        help.push_str(&format!("- Concurrency: 1-{}\n", defaults::MAX_CONCURRENCY));
        help.push_str(&format!("- Rounds: 1-{}\n", defaults::MAX_ROUNDS));
        help.push_str(&format!(
            "- Timeout: greater than 0, at most {} seconds\n\n",
            defaults::MAX_TIMEOUT_SECONDS
        ));

        help.push_str("SUPPORTED VARIABLES:\n");
        for (var_name, description, example) in EnvManager::get_supported_env_vars() {
            if use_colors {
                help.push_str(&format!(
                    "{}:\n  {}\n  Example: {}\n\n",
                    var_name.bright_yellow().bold(),
                    description.white(),
                    example.bright_blue().italic()
                ));
            } else {
                help.push_str(&format!("{}:\n  {}\n  Example: {}\n\n", var_name, description, example));
            }
        }

        help.push_str("EXAMPLE .env FILE:\n");
        help.push_str(&EnvManager::create_example_env_content());

        help
    }
}

impl Default for HelpSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn platform_name() -> String {
    match std::env::consts::OS {
        "windows" => "Windows".to_string(),
        "macos" => "macOS".to_string(),
        "linux" => "Linux".to_string(),
        other => other.to_string(),
    }
}

/// One entry of the options section
struct OptionHelp {
    short: Option<&'static str>,
    long: &'static str,
    value: &'static str,
    description: &'static str,
    example: Option<&'static str>,
}

impl OptionHelp {
    fn format(&self, use_colors: bool) -> String {
        let mut option_str = String::new();

        if let Some(short) = self.short {
            if use_colors {
                option_str.push_str(&format!("  {}, ", format!("-{}", short).bright_cyan()));
            } else {
                option_str.push_str(&format!("  -{}, ", short));
            }
        } else {
            option_str.push_str("      ");
        }

        let long_with_value = if self.value.is_empty() {
            format!("--{}", self.long)
        } else {
            format!("--{} {}", self.long, self.value)
        };

        if use_colors {
            option_str.push_str(&format!("{:<30} {}", long_with_value.bright_cyan(), self.description.white()));
        } else {
            option_str.push_str(&format!("{:<30} {}", long_with_value, self.description));
        }

        if let Some(example) = self.example {
            if use_colors {
                option_str.push_str(&format!(
                    "\n{}{}",
                    " ".repeat(36),
                    format!("Example: {}", example).bright_blue().italic()
                ));
            } else {
                option_str.push_str(&format!("\n{}Example: {}", " ".repeat(36), example));
            }
        }

        option_str
    }
}

/// One entry of the examples section
struct ExampleHelp {
    title: &'static str,
    command: &'static str,
    description: &'static str,
}

impl ExampleHelp {
    fn format(&self, use_colors: bool) -> String {
        if use_colors {
            format!(
                "  {}:\n    {}\n    {}\n",
                self.title.bright_yellow().bold(),
                self.command.bright_white(),
                self.description.bright_blue().italic()
            )
        } else {
            format!("  {}:\n    {}\n    {}\n", self.title, self.command, self.description)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_system_creation() {
        let help_system = HelpSystem::new();
        assert!(!help_system.platform.is_empty());
    }

    #[test]
    fn test_main_help_display() {
        let help_system = HelpSystem::new();
        let plain_help = help_system.display_main_help(false);

        assert!(plain_help.contains("Relay Latency Prober"));
        assert!(plain_help.contains("USAGE:"));
        assert!(plain_help.contains("OPTIONS:"));
        assert!(plain_help.contains("EXAMPLES:"));
        assert!(plain_help.contains("ENVIRONMENT VARIABLES:"));
        assert!(plain_help.contains("--concurrency <N>"));
        assert!(plain_help.contains("ROUND_COUNT"));
        assert!(plain_help.contains("HTTPS_PROXY"));

        let colored_help = help_system.display_main_help(true);
        assert!(colored_help.len() >= plain_help.len());
    }

    #[test]
    fn test_topic_help() {
        let help_system = HelpSystem::new();

        for topic in HelpSystem::TOPICS {
            assert!(help_system.display_topic_help(topic, false).is_some(), "topic {}", topic);
        }
        assert!(help_system.display_topic_help("ENV", false).is_some());
        assert!(help_system.display_topic_help("dns", false).is_none());
        assert!(help_system.display_topic_help("", false).is_none());
    }

    #[test]
    fn test_input_help() {
        let help = HelpSystem::new().display_topic_help("input", false).unwrap();
        assert!(help.contains("INPUT FILE REFERENCE"));
        assert!(help.contains("<ipv4>,<port>[,<tag>]*"));
        assert!(help.contains("1 to 65535"));
    }

    #[test]
    fn test_output_help() {
        let help = HelpSystem::new().display_topic_help("output", false).unwrap();
        assert!(help.contains("OUTPUT FILE REFERENCE"));
        assert!(help.contains("8.8.8.8:53#US Google Failed"));
    }

    #[test]
    fn test_configuration_help() {
        let help = HelpSystem::new().display_topic_help("config", false).unwrap();
        assert!(help.contains("CONFIGURATION REFERENCE"));
        assert!(help.contains("Concurrency: 1-1024"));
        assert!(help.contains("INPUT_FILE"));
        assert!(help.contains("EXAMPLE .env FILE"));
    }

    #[test]
    fn test_option_help_formatting() {
        let option = OptionHelp {
            short: Some("r"),
            long: "rounds",
            value: "<N>",
            description: "Passes over all endpoints",
            example: Some("--rounds 4"),
        };

        let plain = option.format(false);
        assert!(plain.starts_with("  -r, --rounds <N>"));
        assert!(plain.contains("Passes over all endpoints"));
        assert!(plain.contains("Example: --rounds 4"));

        let flag = OptionHelp {
            short: None,
            long: "debug",
            value: "",
            description: "Debug output",
            example: None,
        };
        assert!(flag.format(false).starts_with("      --debug "));
    }

    #[test]
    fn test_example_help_formatting() {
        let example = ExampleHelp {
            title: "Quick run",
            command: "rlp -r 1",
            description: "Single round",
        };
        assert_eq!(example.format(false), "  Quick run:\n    rlp -r 1\n    Single round\n");
    }
}
