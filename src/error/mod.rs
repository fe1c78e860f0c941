//! Error handling for the relay latency prober

use serde::Serialize;
use thiserror::Error;

/// Run-level error types for the relay latency prober
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected as a whole (e.g. no usable endpoints)
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors (reading the input file, writing the output file)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (numbers, JSON, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Check if retrying the same operation could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Prefix the message with context while keeping the category
    pub fn with_context<S: AsRef<str>>(self, context: S) -> Self {
        let context = context.as_ref();
        match self {
            Self::Config(msg) => Self::Config(format!("{}: {}", context, msg)),
            Self::Validation(msg) => Self::Validation(format!("{}: {}", context, msg)),
            Self::Io(msg) => Self::Io(format!("{}: {}", context, msg)),
            Self::Parse(msg) => Self::Parse(format!("{}: {}", context, msg)),
            Self::Internal(msg) => Self::Internal(format!("{}: {}", context, msg)),
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file, environment variables or command line arguments.", msg)
            }
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Each line must look like <ipv4>,<port>[,<tag>]*, e.g. 1.1.1.1,443,US,Cloudflare.", msg)
            }
            Self::Io(msg) => {
                format!("File operation failed: {}\n\nSuggestion: Check that the file exists, file permissions and disk space.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse data: {}\n\nSuggestion: Check the format of your input data or configuration values.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1, // Invalid configuration/usage
            Self::Io(_) => 5,                                            // I/O issues
            Self::Internal(_) => 99,                                     // Internal/unexpected errors
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

/// Reason a single input line was rejected by the address validator
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// Fewer than two comma-separated fields
    #[error("malformed line '{line}': expected <ipv4>,<port>[,<tag>]*")]
    MalformedLine { line: String },

    /// First field is not a dotted-quad IPv4 address
    #[error("invalid IPv4 address '{address}'")]
    InvalidAddress { address: String },

    /// Second field is not an integer in 1..=65535
    #[error("invalid port '{port}': must be an integer between 1 and 65535")]
    InvalidPort { port: String },
}

impl ValidationError {
    /// Short machine-friendly name of the rejection reason
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedLine { .. } => "malformed_line",
            Self::InvalidAddress { .. } => "invalid_address",
            Self::InvalidPort { .. } => "invalid_port",
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        match error {
            dotenv::Error::LineParse(line, index) => {
                Self::parse(format!("Malformed environment file entry '{}' at offset {}", line, index))
            }
            other => Self::config(format!("Environment file error: {}", other)),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::internal(format!("Task failed: {}", error))
    }
}

// Anyhow integration; `{:#}` keeps the whole context chain
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(format!("{:#}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error context trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error
    fn context(self, message: &'static str) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let original_error: AppError = e.into();
            original_error.with_context(f())
        })
    }

    fn context(self, message: &'static str) -> Result<T> {
        self.with_context(|| message.to_string())
    }
}

/// Error reporter for structured error output and user feedback
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", error.format_for_console(self.use_color));

        if self.verbose {
            eprintln!();
            eprintln!("{}", error.user_friendly_message());

            if error.is_recoverable() {
                eprintln!();
                if self.use_color {
                    use colored::Colorize;
                    eprintln!("{}", "This error might be temporary. You can try running the command again.".green());
                } else {
                    eprintln!("This error might be temporary. You can try running the command again.");
                }
            }
        }
    }

    /// Get formatted summary of rejected input lines
    pub fn format_rejections(&self, rejected: &[(usize, ValidationError)]) -> String {
        if rejected.is_empty() {
            return "No rejected lines".to_string();
        }

        let mut summary = format!("Skipped {} invalid line(s):", rejected.len());

        let mut groups: std::collections::BTreeMap<&'static str, usize> = std::collections::BTreeMap::new();
        for (_, error) in rejected {
            *groups.entry(error.kind()).or_default() += 1;
        }

        for (kind, count) in groups {
            summary.push_str(&format!("\n  {}: {}", kind, count));
        }

        if self.verbose {
            for (line_no, error) in rejected {
                summary.push_str(&format!("\n    line {}: {}", line_no, error));
            }
        }

        summary
    }
}

/// Exit with the internal error code when the main thread panics
///
/// Panics on runtime worker threads only print; tokio turns them into a
/// `JoinError` for whoever awaits the task.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        if panic_ends_process(std::thread::current().name()) {
            std::process::exit(AppError::internal("panic").exit_code());
        }
    }));
}

fn panic_ends_process(thread_name: Option<&str>) -> bool {
    thread_name == Some("main")
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}
