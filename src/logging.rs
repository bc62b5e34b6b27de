/// Structured logging for the health-exposure service
///
/// Provides context-rich logging tagged with the pipeline stage and, where
/// relevant, the record's location identifier (`lat,lon@date`). Events are
/// emitted through `tracing`; `init_logger` installs a `tracing-subscriber`
/// formatter writing to stderr or appending to a log file.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::model::HealthmarkError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = HealthmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(HealthmarkError::InvalidConfig(format!(
                "unknown log level '{}'",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingest,
    Scoring,
    Aggregation,
    Storage,
    System,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Ingest => write!(f, "INGEST"),
            Stage::Scoring => write!(f, "SCORE"),
            Stage::Aggregation => write!(f, "AGG"),
            Stage::Storage => write!(f, "STORE"),
            Stage::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - source not configured (no API key) or no coverage
    Expected,
    /// Unexpected failure - indicates service degradation or an API change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Install the global subscriber.
///
/// With `log_file` set, events are appended to that file without ANSI
/// colours. Otherwise they go to stderr, with or without timestamps.
/// A second call keeps the first subscriber.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
) -> Result<(), HealthmarkError> {
    let filter = EnvFilter::new(min_level.as_filter());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| HealthmarkError::Io {
                    path: path.to_string(),
                    source,
                })?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None if console_timestamps => builder.with_writer(std::io::stderr).try_init(),
        None => builder.without_time().with_writer(std::io::stderr).try_init(),
    };

    // try_init only fails when a subscriber is already installed.
    if let Err(e) = installed {
        debug(
            Stage::System,
            None,
            &format!("Subscriber already installed, keeping it: {}", e),
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Log a general informational message
pub fn info(stage: Stage, location: Option<&str>, message: &str) {
    tracing::info!(stage = %stage, location = location.unwrap_or("-"), "{}", message);
}

/// Log a warning message
pub fn warn(stage: Stage, location: Option<&str>, message: &str) {
    tracing::warn!(stage = %stage, location = location.unwrap_or("-"), "{}", message);
}

/// Log an error message
pub fn error(stage: Stage, location: Option<&str>, message: &str) {
    tracing::error!(stage = %stage, location = location.unwrap_or("-"), "{}", message);
}

/// Log a debug message
pub fn debug(stage: Stage, location: Option<&str>, message: &str) {
    tracing::debug!(stage = %stage, location = location.unwrap_or("-"), "{}", message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify an upstream fetch failure recorded on a sample.
pub fn classify_fetch_failure(error_message: &str) -> FailureType {
    // An unconfigured source is a deployment choice, not an outage
    if error_message.contains("API key not configured")
        || error_message.contains("Missing Google API key")
    {
        FailureType::Expected
    }
    // HTTP and transport problems point at the provider or the network
    else if error_message.contains("HTTP") || error_message.contains("timed out") {
        FailureType::Unexpected
    }
    // Body did not match the expected shape: likely an API change
    else if error_message.contains("JSON error") || error_message.contains("decoding") {
        FailureType::Unexpected
    } else {
        FailureType::Unknown
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log every upstream error recorded for one record, with classification.
pub fn log_fetch_failures(location: &str, errors: &[String]) {
    for error_msg in errors {
        let failure_type = classify_fetch_failure(error_msg);
        let message = format!("fetch failed [{}]: {}", failure_type, error_msg);

        match failure_type {
            FailureType::Expected => debug(Stage::Ingest, Some(location), &message),
            FailureType::Unexpected => error(Stage::Ingest, Some(location), &message),
            FailureType::Unknown => warn(Stage::Ingest, Some(location), &message),
        }
    }
}

// ---------------------------------------------------------------------------
// Batch Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a batch run (enrichment or scoring)
pub fn log_batch_summary(stage: Stage, total: usize, successful: usize, skipped: usize) {
    let message = format!(
        "Batch complete: {}/{} processed, {} skipped",
        successful, total, skipped
    );

    if skipped == 0 {
        info(stage, None, &message);
    } else if successful == 0 {
        error(stage, None, &message);
    } else {
        warn(stage, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_failure_classification() {
        assert_eq!(
            classify_fetch_failure("Google Air Quality: API key not configured for Google Air Quality"),
            FailureType::Expected
        );
        assert_eq!(
            classify_fetch_failure("Weather: HTTP error: 500"),
            FailureType::Unexpected
        );
        assert_eq!(
            classify_fetch_failure("Weather: JSON error: expected value at line 1 column 1"),
            FailureType::Unexpected
        );
        assert_eq!(
            classify_fetch_failure("Google Air Quality: No data available: ocean"),
            FailureType::Unknown
        );
    }

    #[test]
    fn test_logging_without_subscriber_is_a_no_op() {
        info(Stage::System, None, "nothing installed");
        log_fetch_failures("40.7128,-74.0060@2024-05-01", &["Weather: HTTP error: 503".to_string()]);
        log_batch_summary(Stage::Scoring, 3, 3, 0);
    }

    #[test]
    fn test_second_init_keeps_first_subscriber() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("healthmark.log");
        let path = path.to_str().unwrap();

        assert!(init_logger(LogLevel::Debug, Some(path), false).is_ok());
        assert!(init_logger(LogLevel::Error, None, true).is_ok());
        info(Stage::System, None, "after reinit");
        assert!(std::path::Path::new(path).exists());
    }

    #[test]
    fn test_unwritable_log_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing/healthmark.log");
        let err = init_logger(LogLevel::Info, path.to_str(), false).unwrap_err();
        assert!(matches!(err, HealthmarkError::Io { .. }));
    }
}
