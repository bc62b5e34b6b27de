/// Environment adapter: vendor reports to `EnvironmentalSample`.
///
/// Combines one Open-Meteo weather report and one Google Air Quality report
/// into the flat, typed sample the scoring engine consumes. Fetch failures
/// are recorded in `errors` (which lowers confidence) and never abort the
/// sample.

use chrono::NaiveDate;

use crate::ingest::google_air::{self, AirQualityReport};
use crate::ingest::open_meteo::{self, WeatherReport};
use crate::ingest::pollutants::extract_pollutants;
use crate::model::EnvironmentalSample;

/// Builds a sample from the outcome of both lookups.
pub fn build_sample(
    weather: &Result<WeatherReport, String>,
    air: &AirQualityReport,
) -> EnvironmentalSample {
    let mut sample = EnvironmentalSample::default();

    match weather {
        Ok(report) => {
            if let Some(noon) = &report.sample_at_local_noon {
                sample.uv_index = noon.uv_index;
                sample.temperature_c = noon.temperature_2m;
                sample.humidity_pct = noon.relative_humidity_2m;
                sample.dewpoint_c = noon.dew_point_2m;
                sample.precipitation_mm = noon.precipitation;
                sample.cloud_cover_pct = noon.cloudcover;
                sample.wind_speed_ms = noon.wind_speed_10m;
            }
            sample.uv_index_max = report.uv_index_max();
            sample.data_sources.push(format!("Weather: {}", report.source));
        }
        Err(e) => sample.errors.push(format!("Weather: {}", e)),
    }

    if let Some(current) = &air.current {
        if let Some(index) = current.indexes.first() {
            sample.air_quality_index = index.aqi;
            sample.air_quality_level = index.category.clone();
        }
        sample.pollutants = extract_pollutants(&current.pollutants);
    }
    sample.data_sources.extend(
        air.used
            .iter()
            .map(|endpoint| format!("Google Air Quality: {}", endpoint)),
    );
    if let Some(e) = &air.error {
        sample.errors.push(format!("Google Air Quality: {}", e));
    }

    sample
}

/// Fetches both sources for one location/date and builds the sample.
/// Without an explicit key the Google key is looked up in the environment.
pub fn fetch_environment(
    client: &reqwest::blocking::Client,
    lat: f64,
    lon: f64,
    day: NaiveDate,
    google_key: Option<&str>,
) -> EnvironmentalSample {
    let weather = open_meteo::fetch_weather(client, lat, lon, day).map_err(|e| e.to_string());
    let key = google_air::resolve_api_key(google_key);
    let air = google_air::fetch_report(client, key.as_deref(), lat, lon);
    build_sample(&weather, &air)
}
