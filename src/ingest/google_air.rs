/// Google Air Quality API Client
///
/// Looks up current air-quality conditions (AQI indexes and pollutant
/// concentrations) for a coordinate pair. Requires a Google Maps Platform
/// key; without one the lookup is skipped and recorded as an error on the
/// sample rather than failing enrichment.
///
/// API Documentation: https://developers.google.com/maps/documentation/air-quality

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::ingest::pollutants::AirQualityConditions;
use crate::ingest::validate_coordinates;
use crate::model::HealthmarkError;

pub const GOOGLE_AIR_BASE: &str = "https://airquality.googleapis.com/v1";

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: &[&str] = &[
    "GOOGLE_MAPS_API_KEY",
    "GOOGLE_MAPS_API",
    "GMAPS_API_KEY",
    "MAPS_API_KEY",
];

// ============================================================================
// Report
// ============================================================================

/// What an enrichment run keeps from the air-quality lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReport {
    /// Endpoints that answered successfully.
    #[serde(default)]
    pub used: Vec<String>,
    #[serde(default)]
    pub current: Option<AirQualityConditions>,
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================================================
// Key resolution
// ============================================================================

/// An explicit, non-blank key wins; otherwise the first non-blank variable
/// from `API_KEY_VARS`.
pub fn resolve_api_key(explicit: Option<&str>) -> Option<String> {
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }
    API_KEY_VARS.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Request body for `currentConditions:lookup`.
pub fn current_conditions_body(lat: f64, lon: f64) -> serde_json::Value {
    json!({
        "location": {"latitude": lat, "longitude": lon},
        "languageCode": "en",
        "universalAqi": true,
        "extraComputations": [
            "HEALTH_RECOMMENDATIONS",
            "DOMINANT_POLLUTANT_CONCENTRATION",
            "POLLUTANT_CONCENTRATION",
            "POLLUTANT_ADDITIONAL_INFO",
            "LOCAL_AQI"
        ]
    })
}

pub fn fetch_current_conditions(
    client: &reqwest::blocking::Client,
    api_key: &str,
    lat: f64,
    lon: f64,
) -> Result<AirQualityConditions, HealthmarkError> {
    validate_coordinates(lat, lon)?;

    let url = format!("{}/currentConditions:lookup", GOOGLE_AIR_BASE);
    let response = client
        .post(&url)
        .header("X-Goog-Api-Key", api_key)
        .json(&current_conditions_body(lat, lon))
        .send()?;

    if !response.status().is_success() {
        return Err(HealthmarkError::HttpStatus(response.status().as_u16()));
    }

    Ok(response.json()?)
}

/// Runs the lookup and folds the outcome into an `AirQualityReport`.
/// Never fails: a missing key or a failed request becomes `error`.
pub fn fetch_report(
    client: &reqwest::blocking::Client,
    api_key: Option<&str>,
    lat: f64,
    lon: f64,
) -> AirQualityReport {
    let Some(key) = api_key else {
        return AirQualityReport {
            error: Some(HealthmarkError::MissingApiKey("Google Air Quality").to_string()),
            ..Default::default()
        };
    };

    match fetch_current_conditions(client, key, lat, lon) {
        Ok(current) => AirQualityReport {
            used: vec!["currentConditions:lookup".to_string()],
            current: Some(current),
            error: None,
        },
        Err(e) => AirQualityReport {
            error: Some(e.to_string()),
            ..Default::default()
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
