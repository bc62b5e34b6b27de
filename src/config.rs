//! Application configuration.
//!
//! Loaded from an optional TOML file with `[scoring]`, `[logging]` and
//! `[ingest]` tables; every key has a default so an empty or absent file is
//! valid. A `.env` file is read first, and the environment can override the
//! log settings and the Google API key.
//!
//! ```toml
//! [logging]
//! level = "debug"
//! file = "healthmark.log"
//!
//! [ingest]
//! max_requests = 25
//! request_delay_ms = 1000
//!
//! [scoring.pollutants]
//! pm25_24h_ugm3 = 15.0
//!
//! [scoring.weights]
//! pm25 = 0.30
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ingest::google_air;
use crate::logging::LogLevel;
use crate::model::HealthmarkError;
use crate::scoring::ScoringConfig;

pub const ENV_LOG_LEVEL: &str = "HEALTHMARK_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "HEALTHMARK_LOG_FILE";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

impl LoggingConfig {
    pub fn log_level(&self) -> Result<LogLevel, HealthmarkError> {
        self.level.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Upper bound on locations fetched per run, to respect rate limits.
    pub max_requests: usize,
    /// Pause between consecutive locations.
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    /// Google Maps Platform key; falls back to the usual env variables.
    pub google_api_key: Option<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_requests: 50,
            request_delay_ms: 500,
            timeout_secs: 20,
            google_api_key: None,
        }
    }
}

// ---------------------------------------------------------------------------
// App config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scoring: ScoringConfig,
    pub logging: LoggingConfig,
    pub ingest: IngestConfig,
}

impl AppConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, HealthmarkError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, or returns defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, HealthmarkError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path).map_err(|source| HealthmarkError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads `.env` (if any), the TOML file, then environment overrides.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self, HealthmarkError> {
        dotenv::dotenv().ok();
        let mut config = Self::load(path)?;
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from a variable lookup. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(file) = get(ENV_LOG_FILE) {
            self.logging.file = Some(file);
        }
        if self.ingest.google_api_key.is_none() {
            self.ingest.google_api_key = google_air::API_KEY_VARS.iter().find_map(|name| get(name));
        }
    }

    pub fn validate(&self) -> Result<(), HealthmarkError> {
        self.scoring.validate()?;
        self.logging.log_level()?;
        if self.ingest.timeout_secs == 0 {
            return Err(HealthmarkError::InvalidConfig(
                "ingest.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
