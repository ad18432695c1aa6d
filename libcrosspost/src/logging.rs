//! Log output for the crosspost server
//!
//! The server logs to stderr. The format comes from `CROSSPOST_LOG_FORMAT`
//! unless `--log-format` is given on the command line, and `--verbose` raises
//! the level to debug. A `RUST_LOG` directive beats both, so request traces
//! from `tower_http` can be switched on without a restart flag.
//!
//! ```no_run
//! use libcrosspost::logging::{LogFormat, LoggingConfig};
//!
//! LoggingConfig::from_env()
//!     .with_overrides(Some(LogFormat::Json), false)
//!     .init();
//! ```

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text output (no colors, for piping)
    Text,
    /// Machine-parseable JSON (one JSON object per line)
    Json,
    /// Pretty-printed with colors (for development)
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Configuration for logging initialization
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    pub verbose: bool,
}

impl LoggingConfig {
    /// Create a new logging configuration
    ///
    /// `verbose` forces the debug level unless `RUST_LOG` says otherwise.
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Format and level from `CROSSPOST_LOG_FORMAT` / `CROSSPOST_LOG_LEVEL`
    pub fn from_env() -> Self {
        let format = std::env::var("CROSSPOST_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(LogFormat::Text);

        let level = std::env::var("CROSSPOST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self::new(format, level, false)
    }

    /// Apply command-line flags on top of the environment
    pub fn with_overrides(mut self, format: Option<LogFormat>, verbose: bool) -> Self {
        if let Some(format) = format {
            self.format = format;
        }
        self.verbose = self.verbose || verbose;
        self
    }

    fn filter_directive(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            &self.level
        }
    }

    /// Initialize logging with the configured settings
    ///
    /// # Panics
    ///
    /// Panics if the logging subscriber has already been initialized
    pub fn init(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.filter_directive()));

        match self.format {
            LogFormat::Json => {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true)
                    .flatten_event(true)
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::fmt()
                    .pretty()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .init();
            }
            LogFormat::Text => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_level(true)
                    .init();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("Json".parse::<LogFormat>().unwrap(), LogFormat::Json);
    }

    #[test]
    fn test_log_format_from_str_invalid() {
        let result = "invalid".parse::<LogFormat>();
        assert!(result
            .unwrap_err()
            .contains("Invalid log format: 'invalid'"));
    }

    #[test]
    fn test_log_format_display() {
        assert_eq!(LogFormat::Text.to_string(), "text");
        assert_eq!(LogFormat::Json.to_string(), "json");
        assert_eq!(LogFormat::Pretty.to_string(), "pretty");
    }

    #[test]
    fn test_verbose_overrides_level() {
        let config = LoggingConfig::new(LogFormat::Text, "warn".to_string(), true);
        assert_eq!(config.filter_directive(), "debug");

        let quiet = LoggingConfig::new(LogFormat::Text, "warn".to_string(), false);
        assert_eq!(quiet.filter_directive(), "warn");
    }

    #[test]
    fn test_flags_override_environment() {
        let config = LoggingConfig::new(LogFormat::Text, "info".to_string(), false)
            .with_overrides(Some(LogFormat::Pretty), true);
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.filter_directive(), "debug");

        let untouched = LoggingConfig::new(LogFormat::Json, "warn".to_string(), false)
            .with_overrides(None, false);
        assert_eq!(untouched.format, LogFormat::Json);
        assert_eq!(untouched.filter_directive(), "warn");
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("CROSSPOST_LOG_FORMAT", "json");
        std::env::set_var("CROSSPOST_LOG_LEVEL", "trace");
        let config = LoggingConfig::from_env();
        std::env::remove_var("CROSSPOST_LOG_FORMAT");
        std::env::remove_var("CROSSPOST_LOG_LEVEL");

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "trace");
        assert!(!config.verbose);
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        std::env::remove_var("CROSSPOST_LOG_FORMAT");
        std::env::remove_var("CROSSPOST_LOG_LEVEL");
        let config = LoggingConfig::from_env();
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.level, "info");
    }
}
