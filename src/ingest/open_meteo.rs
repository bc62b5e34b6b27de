/// Open-Meteo Weather API Client
///
/// Retrieves hourly weather (temperature, humidity, dew point, wind,
/// precipitation, UV) and the daily UV maximum for one location and date.
/// Today and future dates use the forecast endpoint; past dates use the
/// historical-forecast archive. With `timezone=auto` the hourly timestamps
/// are local to the location, so the representative sample for a day is
/// the hourly slot closest to local noon.
///
/// API Documentation: https://open-meteo.com/en/docs

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ingest::validate_coordinates;
use crate::model::HealthmarkError;

pub const OPEN_METEO_FORECAST: &str = "https://api.open-meteo.com/v1/forecast";
pub const OPEN_METEO_HISTORICAL: &str = "https://historical-forecast-api.open-meteo.com/v1/forecast";

const HOURLY_VARIABLES: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "dew_point_2m",
    "apparent_temperature",
    "precipitation",
    "cloudcover",
    "wind_speed_10m",
    "uv_index",
    "uv_index_clear_sky",
];

const DAILY_VARIABLES: &[&str] = &["uv_index_max", "uv_index_clear_sky_max"];

/// Open-Meteo hourly timestamps: local time, minute precision.
const HOURLY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

// ============================================================================
// Open-Meteo API Response Structures
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenMeteoResponse {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub utc_offset_seconds: Option<i32>,
    #[serde(default)]
    pub hourly: Option<HourlySeries>,
    #[serde(default)]
    pub daily: Option<DailySeries>,
}

/// Column-oriented hourly series; every vector is indexed like `time`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub dew_point_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub apparent_temperature: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
    #[serde(default)]
    pub cloudcover: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub uv_index: Vec<Option<f64>>,
    #[serde(default)]
    pub uv_index_clear_sky: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub uv_index_max: Vec<Option<f64>>,
    #[serde(default)]
    pub uv_index_clear_sky_max: Vec<Option<f64>>,
}

/// One row of the hourly series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySample {
    pub time: String,
    pub temperature_2m: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub dew_point_2m: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub cloudcover: Option<f64>,
    /// m/s (requested with `wind_speed_unit=ms`).
    pub wind_speed_10m: Option<f64>,
    pub uv_index: Option<f64>,
    pub uv_index_clear_sky: Option<f64>,
}

/// Weather data for one location/date as handed to the environment adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Endpoint the data came from.
    pub source: String,
    pub raw: OpenMeteoResponse,
    pub sample_at_local_noon: Option<HourlySample>,
}

impl WeatherReport {
    /// First value of the daily `uv_index_max` series, if reported.
    pub fn uv_index_max(&self) -> Option<f64> {
        self.raw
            .daily
            .as_ref()
            .and_then(|d| d.uv_index_max.first().copied().flatten())
    }
}

// ============================================================================
// URL Construction
// ============================================================================

/// Picks the forecast endpoint for `day >= today`, the archive otherwise.
pub fn endpoint_for(day: NaiveDate, today: NaiveDate) -> &'static str {
    if day >= today {
        OPEN_METEO_FORECAST
    } else {
        OPEN_METEO_HISTORICAL
    }
}

/// Builds a single-day request URL for `(lat, lon)`.
pub fn build_forecast_url(lat: f64, lon: f64, day: NaiveDate, today: NaiveDate) -> String {
    let date = day.format("%Y-%m-%d");
    format!(
        "{}?latitude={:.4}&longitude={:.4}&hourly={}&daily={}&timezone=auto&wind_speed_unit=ms&start_date={}&end_date={}",
        endpoint_for(day, today),
        lat,
        lon,
        HOURLY_VARIABLES.join(","),
        DAILY_VARIABLES.join(","),
        date,
        date,
    )
}

// ============================================================================
// Response Parsing
// ============================================================================

pub fn parse_forecast_response(json: &str) -> Result<OpenMeteoResponse, HealthmarkError> {
    Ok(serde_json::from_str(json)?)
}

/// Returns the hourly row closest to 12:00 local time on `day`.
///
/// Timestamps that do not parse are skipped; ties resolve to the earlier
/// slot. Returns `None` when the series is missing or has no usable time.
pub fn sample_at_local_noon(response: &OpenMeteoResponse, day: NaiveDate) -> Option<HourlySample> {
    let hourly = response.hourly.as_ref()?;
    let noon = day.and_hms_opt(12, 0, 0)?;

    let idx = hourly
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, t)| {
            NaiveDateTime::parse_from_str(t, HOURLY_TIME_FORMAT)
                .ok()
                .map(|ts| ((ts - noon).num_seconds().abs(), i))
        })
        .min()?
        .1;

    let at = |series: &[Option<f64>]| series.get(idx).copied().flatten();

    Some(HourlySample {
        time: hourly.time[idx].clone(),
        temperature_2m: at(&hourly.temperature_2m),
        relative_humidity_2m: at(&hourly.relative_humidity_2m),
        dew_point_2m: at(&hourly.dew_point_2m),
        apparent_temperature: at(&hourly.apparent_temperature),
        precipitation: at(&hourly.precipitation),
        cloudcover: at(&hourly.cloudcover),
        wind_speed_10m: at(&hourly.wind_speed_10m),
        uv_index: at(&hourly.uv_index),
        uv_index_clear_sky: at(&hourly.uv_index_clear_sky),
    })
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Fetches weather for one location and date.
pub fn fetch_weather(
    client: &reqwest::blocking::Client,
    lat: f64,
    lon: f64,
    day: NaiveDate,
) -> Result<WeatherReport, HealthmarkError> {
    validate_coordinates(lat, lon)?;

    let today = Utc::now().date_naive();
    let url = build_forecast_url(lat, lon, day, today);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()?;

    if !response.status().is_success() {
        return Err(HealthmarkError::HttpStatus(response.status().as_u16()));
    }

    let raw: OpenMeteoResponse = response.json()?;
    let sample_at_local_noon = sample_at_local_noon(&raw, day);

    Ok(WeatherReport {
        source: endpoint_for(day, today).to_string(),
        raw,
        sample_at_local_noon,
    })
}

// ============================================================================
// Tests
// ============================================================================
