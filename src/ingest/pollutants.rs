//! Pollutant extraction from Google Air Quality payloads.
//!
//! The air-quality vendor reports a list of `{code, concentration:
//! {microgramsPerCubicMeter}}` entries. This module flattens that list into
//! `PollutantConcentrations` in canonical units:
//!
//! | code | canonical key | conversion |
//! |------|---------------|------------|
//! | pm25 | `pm25_ugm3`   | none       |
//! | pm10 | `pm10_ugm3`   | none       |
//! | o3   | `o3_ppb`      | × 1000     |
//! | no2  | `no2_ugm3`    | none       |
//! | so2  | `so2_ugm3`    | none       |
//! | co   | `co_ppm`      | ÷ 1000     |
//!
//! Unknown codes are ignored. A missing or malformed payload yields an empty
//! result; extraction never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::PollutantConcentrations;

// ============================================================================
// Vendor payload structures
// ============================================================================

/// `currentConditions:lookup` response body (only the fields we use).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityConditions {
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub indexes: Vec<AqiIndex>,
    #[serde(default)]
    pub pollutants: Vec<PollutantEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AqiIndex {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub aqi: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub dominant_pollutant: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantEntry {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub concentration: Option<Concentration>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Concentration {
    #[serde(rename = "microgramsPerCubicMeter", default)]
    pub micrograms_per_cubic_meter: Option<f64>,
}

// ============================================================================
// Extraction
// ============================================================================

/// Flattens typed pollutant entries into canonical concentrations.
/// When a code repeats, the last entry wins.
pub fn extract_pollutants(entries: &[PollutantEntry]) -> PollutantConcentrations {
    let mut out = PollutantConcentrations::default();

    for entry in entries {
        let Some(value) = entry
            .concentration
            .as_ref()
            .and_then(|c| c.micrograms_per_cubic_meter)
            .filter(|v| v.is_finite())
        else {
            continue;
        };

        match entry.code.to_ascii_lowercase().as_str() {
            "pm25" => out.pm25_ugm3 = Some(value),
            "pm10" => out.pm10_ugm3 = Some(value),
            "o3" => out.o3_ppb = Some(value * 1000.0),
            "no2" => out.no2_ugm3 = Some(value),
            "so2" => out.so2_ugm3 = Some(value),
            "co" => out.co_ppm = Some(value / 1000.0),
            _ => {}
        }
    }

    out
}

/// Extracts pollutants from an untyped payload.
///
/// Accepts either the conditions object itself (`{"pollutants": [...]}`) or
/// the stored wrapper (`{"current": {"pollutants": [...]}}`). Entries that do
/// not match the expected shape are skipped individually.
pub fn extract_pollutants_from_value(payload: &Value) -> PollutantConcentrations {
    let list = payload
        .get("pollutants")
        .or_else(|| payload.get("current").and_then(|c| c.get("pollutants")))
        .and_then(Value::as_array);

    let Some(list) = list else {
        return PollutantConcentrations::default();
    };

    let entries: Vec<PollutantEntry> = list
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect();

    extract_pollutants(&entries)
}

// ============================================================================
// Tests
// ============================================================================
