/// Upstream data collection and vendor payload normalisation.
///
/// Submodules:
/// - `open_meteo`: blocking Open-Meteo weather client.
/// - `google_air`: blocking Google Air Quality client.
/// - `pollutants`: pollutant list to canonical concentrations.
/// - `environment`: combines both vendors into an `EnvironmentalSample`.

pub mod environment;
pub mod google_air;
pub mod open_meteo;
pub mod pollutants;

use crate::model::HealthmarkError;

/// Rejects coordinates outside WGS84 range before any request is made.
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), HealthmarkError> {
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        Err(HealthmarkError::InvalidCoordinates { lat, lon })
    }
}
