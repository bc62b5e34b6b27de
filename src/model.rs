/// Core data types for the health-exposure scoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It holds types only: environmental samples, factor scores, the derived
/// `HealthMetrics` record, period summaries and the error type used by the
/// I/O layers. The scoring core itself never returns an error.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Factors
// ---------------------------------------------------------------------------

/// One environmental risk dimension.
///
/// Serialised with the short keys used in persisted records
/// (`pm25`, `o3`, ..., `humidity_dew`, `precip`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Pm25,
    O3,
    No2,
    So2,
    Co,
    Uv,
    Temp,
    HumidityDew,
    Wind,
    Precip,
}

impl Factor {
    /// All factors in composite-weight order. Summation over weights always
    /// follows this order so floating-point results are reproducible.
    pub const ALL: [Factor; 10] = [
        Factor::Pm25,
        Factor::O3,
        Factor::No2,
        Factor::So2,
        Factor::Co,
        Factor::Uv,
        Factor::Temp,
        Factor::HumidityDew,
        Factor::Wind,
        Factor::Precip,
    ];

    /// The persisted key for this factor.
    pub fn key(self) -> &'static str {
        match self {
            Factor::Pm25 => "pm25",
            Factor::O3 => "o3",
            Factor::No2 => "no2",
            Factor::So2 => "so2",
            Factor::Co => "co",
            Factor::Uv => "uv",
            Factor::Temp => "temp",
            Factor::HumidityDew => "humidity_dew",
            Factor::Wind => "wind",
            Factor::Precip => "precip",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Per-factor risk scores in [0, 100].
///
/// `scoring::score` always fills all ten keys. Records read back from disk
/// may lack some, which the period aggregator tolerates.
pub type FactorScores = BTreeMap<Factor, u8>;

// ---------------------------------------------------------------------------
// Risk levels and exposure flags
// ---------------------------------------------------------------------------

/// Discrete risk label derived from a factor score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Minimal Risk")]
    Minimal,
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Very High Risk")]
    VeryHigh,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Minimal => "Minimal Risk",
            RiskLevel::Low => "Low Risk",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::High => "High Risk",
            RiskLevel::VeryHigh => "Very High Risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Conditions flagged in `HealthMetrics::exposure_hours`.
///
/// Each flag is 0 or 1 for a single sample ("was this hour risky"), not an
/// accumulated duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureKind {
    UvProtectionNeeded,
    HeatStress,
    ColdStress,
}

// ---------------------------------------------------------------------------
// Environmental input
// ---------------------------------------------------------------------------

/// Pollutant concentrations in canonical units, keyed by canonical name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantConcentrations {
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub pm25_ugm3: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub pm10_ugm3: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub o3_ppb: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub no2_ugm3: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub so2_ugm3: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub co_ppm: Option<f64>,
}

impl PollutantConcentrations {
    pub fn is_empty(&self) -> bool {
        self.pm25_ugm3.is_none()
            && self.pm10_ugm3.is_none()
            && self.o3_ppb.is_none()
            && self.no2_ugm3.is_none()
            && self.so2_ugm3.is_none()
            && self.co_ppm.is_none()
    }
}

/// One location/date's environmental readings as consumed by the scorer.
///
/// Every reading is optional; absence is never the same as a zero reading.
/// Field aliases accept the key names used in persisted `environmental_data`
/// objects (`temperature`, `humidity`, `wind_speed`, `precipitation`).
/// Values of the wrong JSON type deserialise as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalSample {
    #[serde(default, deserialize_with = "lenient_number")]
    pub uv_index: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub uv_index_max: Option<f64>,
    #[serde(default, alias = "temperature", deserialize_with = "lenient_number")]
    pub temperature_c: Option<f64>,
    #[serde(default, alias = "humidity", deserialize_with = "lenient_number")]
    pub humidity_pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub dewpoint_c: Option<f64>,
    #[serde(default, alias = "wind_speed", deserialize_with = "lenient_number")]
    pub wind_speed_ms: Option<f64>,
    #[serde(default, alias = "precipitation", deserialize_with = "lenient_number")]
    pub precipitation_mm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub air_quality_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_quality_level: Option<String>,
    #[serde(default, alias = "cloud_cover", deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub cloud_cover_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "PollutantConcentrations::is_empty")]
    pub pollutants: PollutantConcentrations,
    #[serde(default)]
    pub data_sources: Vec<String>,
    /// Diagnostic messages from upstream fetch failures. Lowers confidence,
    /// never blocks scoring.
    #[serde(default)]
    pub errors: Vec<String>,
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).filter(|v| v.is_finite()))
}

fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
    }))
}

// ---------------------------------------------------------------------------
// Derived metrics
// ---------------------------------------------------------------------------

/// Health metrics derived from exactly one `EnvironmentalSample`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    pub scores: FactorScores,
    pub composite_score: u8,
    pub confidence: f64,
    pub risk_levels: BTreeMap<Factor, RiskLevel>,
    #[serde(default)]
    pub exposure_hours: BTreeMap<ExposureKind, u8>,
    #[serde(default)]
    pub insights: Vec<String>,
}

/// A scored record bound to its date and location, as consumed by the
/// period aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub date: NaiveDate,
    pub lat: f64,
    pub lon: f64,
    pub metrics: HealthMetrics,
}

// ---------------------------------------------------------------------------
// Persisted records
// ---------------------------------------------------------------------------

/// One entry of an enriched JSON file.
///
/// Location extraction produces `{date_str, lat, lon, ...}`; enrichment adds
/// `environmental_data`, scoring adds `health_metrics`. Any other keys are
/// carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(default)]
    pub date_str: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environmental_data: Option<EnvironmentalSample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_metrics: Option<HealthMetrics>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EnrichedRecord {
    /// Short identifier used in log lines: `"lat,lon@date"`.
    pub fn location_id(&self) -> String {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => format!(
                "{:.4},{:.4}@{}",
                lat,
                lon,
                self.date_str.as_deref().unwrap_or("?")
            ),
            _ => format!("?@{}", self.date_str.as_deref().unwrap_or("?")),
        }
    }
}

// ---------------------------------------------------------------------------
// Period aggregation
// ---------------------------------------------------------------------------

/// Grouping granularity for period summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    /// ISO 8601 week (Monday start).
    Weekly,
    Monthly,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = HealthmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Period::Daily),
            "weekly" | "week" => Ok(Period::Weekly),
            "monthly" | "month" => Ok(Period::Monthly),
            other => Err(HealthmarkError::InvalidPeriod(other.to_string())),
        }
    }
}

/// Summary statistics for all records sharing one calendar period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// `2024-05-01`, `2024-W18` or `2024-05`.
    pub period: String,
    pub period_type: Period,
    /// First calendar day of the period.
    pub start_date: NaiveDate,
    pub count: usize,
    pub avg_composite_score: f64,
    pub max_composite_score: u8,
    pub avg_confidence: f64,
    pub scores: BTreeMap<Factor, f64>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from the I/O layers around the scoring core: configuration,
/// persistence and upstream fetches.
#[derive(Debug, Error)]
pub enum HealthmarkError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    HttpStatus(u16),

    #[error("No data available: {0}")]
    NoDataAvailable(String),

    #[error("API key not configured for {0}")]
    MissingApiKey(&'static str),

    #[error("Invalid coordinates: lat={lat}, lon={lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("Unknown aggregation period '{0}' (expected daily, weekly or monthly)")]
    InvalidPeriod(String),

    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    #[error("Unknown factor '{0}'")]
    UnknownFactor(String),
}
