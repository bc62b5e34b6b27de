/// Factor registry for the health-exposure scoring service.
///
/// Defines the canonical metadata for each scored factor: display name,
/// unit of the reading it consumes, the guideline its curve is anchored on,
/// and which `EnvironmentalSample` fields feed it. The coverage report and
/// `healthmark factors` read from here rather than hardcoding factor names.

use crate::model::{Factor, HealthmarkError};

// ---------------------------------------------------------------------------
// Sample field names
// ---------------------------------------------------------------------------

pub const FIELD_UV_INDEX: &str = "uv_index";
pub const FIELD_UV_INDEX_MAX: &str = "uv_index_max";
pub const FIELD_TEMPERATURE: &str = "temperature_c";
pub const FIELD_HUMIDITY: &str = "humidity_pct";
pub const FIELD_DEWPOINT: &str = "dewpoint_c";
pub const FIELD_WIND_SPEED: &str = "wind_speed_ms";
pub const FIELD_PRECIPITATION: &str = "precipitation_mm";
pub const FIELD_AIR_QUALITY_INDEX: &str = "air_quality_index";
pub const FIELD_PM25: &str = "pollutants.pm25_ugm3";
pub const FIELD_O3: &str = "pollutants.o3_ppb";
pub const FIELD_NO2: &str = "pollutants.no2_ugm3";
pub const FIELD_SO2: &str = "pollutants.so2_ugm3";
pub const FIELD_CO: &str = "pollutants.co_ppm";

// ---------------------------------------------------------------------------
// Factor metadata
// ---------------------------------------------------------------------------

/// Metadata for a single scored factor.
#[derive(Debug)]
pub struct FactorInfo {
    pub factor: Factor,
    /// Human-readable name used in reports.
    pub name: &'static str,
    /// Unit of the primary reading.
    pub unit: &'static str,
    /// Public guideline the default curve is anchored on.
    pub guideline: &'static str,
    pub description: &'static str,
    /// Sample fields the scorer reads. Any one present yields a non-zero
    /// score when the reading is elevated.
    pub input_fields: &'static [&'static str],
    /// Fields that only adjust a score computed from `input_fields` and
    /// cannot produce one on their own.
    pub modifier_fields: &'static [&'static str],
}

/// All scored factors, in composite-weight order.
///
/// Sources:
///   - WHO Global Air Quality Guidelines (2021)
///   - US EPA AQI breakpoints
///   - WHO/WMO UV index guidance
pub static FACTOR_REGISTRY: &[FactorInfo] = &[
    FactorInfo {
        factor: Factor::Pm25,
        name: "Fine particulate matter (PM2.5)",
        unit: "µg/m³",
        guideline: "WHO 24h 15 µg/m³; EPA AQI 100 at 35 µg/m³",
        description: "Dominant respiratory and cardiovascular pollutant. \
                      Carries the largest composite weight.",
        input_fields: &[FIELD_PM25],
        modifier_fields: &[],
    },
    FactorInfo {
        factor: Factor::O3,
        name: "Ozone (O3)",
        unit: "ppb",
        guideline: "EPA AQI 100 at 70 ppb (8h)",
        description: "Afternoon photochemical oxidant; steeper risk above the \
                      knee of its curve.",
        input_fields: &[FIELD_O3],
        modifier_fields: &[],
    },
    FactorInfo {
        factor: Factor::No2,
        name: "Nitrogen dioxide (NO2)",
        unit: "µg/m³",
        guideline: "WHO annual 10 µg/m³",
        description: "Traffic-related combustion gas.",
        input_fields: &[FIELD_NO2],
        modifier_fields: &[],
    },
    FactorInfo {
        factor: Factor::So2,
        name: "Sulphur dioxide (SO2)",
        unit: "µg/m³",
        guideline: "WHO 24h 40 µg/m³",
        description: "Industrial combustion gas.",
        input_fields: &[FIELD_SO2],
        modifier_fields: &[],
    },
    FactorInfo {
        factor: Factor::Co,
        name: "Carbon monoxide (CO)",
        unit: "ppm",
        guideline: "WHO 24h 4 mg/m³ (≈3.5 ppm)",
        description: "Rarely elevated outdoors; low composite weight.",
        input_fields: &[FIELD_CO],
        modifier_fields: &[],
    },
    FactorInfo {
        factor: Factor::Uv,
        name: "Ultraviolet radiation",
        unit: "UV index",
        guideline: "WHO: protection needed at 3+, very high at 8+",
        description: "Scored on the hourly index. A daily maximum of 8+ adds a \
                      peak-day bonus but never scores without an hourly reading.",
        input_fields: &[FIELD_UV_INDEX],
        modifier_fields: &[FIELD_UV_INDEX_MAX],
    },
    FactorInfo {
        factor: Factor::Temp,
        name: "Air temperature",
        unit: "°C",
        guideline: "Comfort band 18-24 °C",
        description: "Risk rises in both directions away from the comfort band.",
        input_fields: &[FIELD_TEMPERATURE],
        modifier_fields: &[],
    },
    FactorInfo {
        factor: Factor::HumidityDew,
        name: "Humidity and dew point",
        unit: "% RH / °C",
        guideline: "RH 30-60%; dew point above 70 °F is oppressive",
        description: "Dry or damp air plus muggy-air penalty from the dew point.",
        input_fields: &[FIELD_HUMIDITY, FIELD_DEWPOINT],
        modifier_fields: &[],
    },
    FactorInfo {
        factor: Factor::Wind,
        name: "Wind",
        unit: "m/s",
        guideline: "Dust above 30 km/h; hazard above 60 km/h",
        description: "Scored on km/h after conversion from the stored m/s.",
        input_fields: &[FIELD_WIND_SPEED],
        modifier_fields: &[],
    },
    FactorInfo {
        factor: Factor::Precip,
        name: "Precipitation",
        unit: "mm",
        guideline: "Heavy rain at 50 mm/day",
        description: "Zero below the heavy-rain threshold, then linear in the \
                      excess.",
        input_fields: &[FIELD_PRECIPITATION],
        modifier_fields: &[],
    },
];

// ---------------------------------------------------------------------------
// Lookup helpers
// ---------------------------------------------------------------------------

/// Look up a factor by its persisted key (`"pm25"`, `"humidity_dew"`, ...).
pub fn find_factor(key: &str) -> Option<&'static FactorInfo> {
    FACTOR_REGISTRY.iter().find(|info| info.factor.key() == key)
}

/// The whole registry, or the single factor named by `key`.
pub fn select(key: Option<&str>) -> Result<Vec<&'static FactorInfo>, HealthmarkError> {
    match key {
        Some(key) => find_factor(key)
            .map(|info| vec![info])
            .ok_or_else(|| HealthmarkError::UnknownFactor(key.to_string())),
        None => Ok(FACTOR_REGISTRY.iter().collect()),
    }
}

/// Multi-line listing of one factor for `healthmark factors`.
pub fn describe(info: &FactorInfo) -> String {
    let mut out = format!(
        "{:<13} {} [{}]\n    guideline: {}\n    {}\n    reads: {}",
        info.factor.key(),
        info.name,
        info.unit,
        info.guideline,
        info.description,
        info.input_fields.join(", ")
    );
    if !info.modifier_fields.is_empty() {
        out.push_str(&format!(" (adjusted by {})", info.modifier_fields.join(", ")));
    }
    out
}

/// Every sample field read by some scorer, in registry order, plus the
/// reported AQI. No duplicates.
pub fn observed_fields() -> Vec<&'static str> {
    let mut fields: Vec<&'static str> = Vec::new();
    for info in FACTOR_REGISTRY {
        for field in info.input_fields.iter().chain(info.modifier_fields) {
            if !fields.contains(field) {
                fields.push(field);
            }
        }
    }
    fields.push(FIELD_AIR_QUALITY_INDEX);
    fields
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
