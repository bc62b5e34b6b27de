/// Integration tests for the offline pipeline
///
/// These tests verify:
/// 1. Location files load, survive a save/load round trip, and keep
///    unknown keys
/// 2. Enriched records score in place and persist `health_metrics`
/// 3. Scored files roll up into daily, weekly and monthly summaries
/// 4. A TOML config file changes scoring behaviour
/// 5. Coverage reporting over a persisted batch
///
/// No network access is needed; enrichment is represented by records that
/// already carry `environmental_data`.

use std::fs;

use healthmark_service::analysis;
use healthmark_service::config::AppConfig;
use healthmark_service::model::{EnrichedRecord, Factor, Period};
use healthmark_service::scoring::ScoringConfig;
use healthmark_service::{storage, verify};

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn enriched_fixture() -> serde_json::Value {
    json!([
        {
            "date_str": "2024-04-29",
            "lat": 40.7128, "lon": -74.0060,
            "place_name": "Office",
            "environmental_data": {
                "uv_index": 5.0, "temperature": 21.0, "humidity": 45,
                "wind_speed": 3.0, "precipitation": 0.0, "air_quality_index": 40,
                "pollutants": {"pm25_ugm3": 7.5},
                "data_sources": ["Weather: https://historical-forecast-api.open-meteo.com/v1/forecast"],
                "errors": []
            }
        },
        {
            "date_str": "2024-05-01T18:30:00-04:00",
            "lat": 40.7128, "lon": -74.0060,
            "environmental_data": {
                "uv_index": 9.0, "uv_index_max": 9.5, "temperature": 35.0, "humidity": 20,
                "pollutants": {"pm25_ugm3": 40.0},
                "errors": ["Google Air Quality: HTTP error: 429"]
            }
        },
        {
            "date_str": "2024-05-06",
            "lat": 41.8781, "lon": -87.6298,
            "environmental_data": {"temperature": -5.0, "wind_speed": 20.0}
        },
        {
            "date_str": "2024-05-07",
            "lat": 41.8781, "lon": -87.6298
        }
    ])
}

fn write_fixture(dir: &TempDir, name: &str, value: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[test]
fn records_round_trip_through_disk() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "enriched.json", &enriched_fixture());

    let records = storage::load_records(&input).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].extra["place_name"], "Office");
    assert!(records[3].environmental_data.is_none());

    let nested = dir.path().join("out/nested/copy.json");
    storage::save_records(&nested, &records).unwrap();
    let reloaded = storage::load_records(&nested).unwrap();
    assert_eq!(reloaded, records);
}

#[test]
fn loading_malformed_file_reports_json_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "[{\"lat\": 1.0,").unwrap();
    let err = storage::load_records(&path).unwrap_err();
    assert!(err.to_string().starts_with("JSON error"));
}

#[test]
fn loading_missing_file_names_the_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");
    let err = storage::load_records(&path).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}

// ---------------------------------------------------------------------------
// Scoring + aggregation
// ---------------------------------------------------------------------------

#[test]
fn score_persist_and_summarize() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "enriched.json", &enriched_fixture());
    let scored_path = dir.path().join("scored.json");

    let records = storage::load_records(&input).unwrap();
    let scored = storage::score_records(records, &ScoringConfig::default());
    storage::save_records(&scored_path, &scored).unwrap();

    // health_metrics is written with its wire names
    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&scored_path).unwrap()).unwrap();
    assert_eq!(raw[1]["health_metrics"]["composite_score"], 58);
    assert_eq!(raw[1]["health_metrics"]["risk_levels"]["pm25"], "Very High Risk");
    assert_eq!(raw[2]["health_metrics"]["exposure_hours"]["cold_stress"], 1);
    assert!(raw[3].get("health_metrics").is_none());
    assert_eq!(raw[0]["place_name"], "Office");

    let reloaded: Vec<EnrichedRecord> = storage::load_records(&scored_path).unwrap();
    let bound = storage::scored_records(&reloaded);
    assert_eq!(bound.len(), 3);

    let weekly = analysis::aggregate(&bound, Period::Weekly);
    let labels: Vec<(&str, usize)> = weekly.iter().map(|s| (s.period.as_str(), s.count)).collect();
    assert_eq!(labels, vec![("2024-W18", 2), ("2024-W19", 1)]);
    assert_eq!(weekly[0].max_composite_score, 58);

    let monthly = analysis::aggregate(&bound, Period::Monthly);
    assert_eq!(monthly.len(), 2);
    assert_eq!(monthly[0].period, "2024-04");
    assert_eq!(monthly[1].period, "2024-05");
    assert_eq!(monthly[1].count, 2);

    let daily = analysis::aggregate(&bound, Period::Daily);
    assert_eq!(daily.len(), 3);
    assert_eq!(daily[1].scores[&Factor::Pm25], 100.0);
}

#[test]
fn summaries_serialise_for_output() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "enriched.json", &enriched_fixture());
    let scored = storage::score_records(storage::load_records(&input).unwrap(), &ScoringConfig::default());
    let summaries = analysis::aggregate(&storage::scored_records(&scored), Period::Monthly);

    let out = dir.path().join("reports/monthly.json");
    storage::write_json(&out, &summaries).unwrap();
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value[0]["period_type"], "monthly");
    assert_eq!(value[0]["start_date"], "2024-04-01");
    assert!(value[0]["scores"]["humidity_dew"].is_number());
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn config_file_overrides_scoring_thresholds() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("healthmark.toml");
    fs::write(
        &config_path,
        r#"
        [logging]
        level = "warn"

        [scoring]
        insight_threshold = 20

        [scoring.thermal]
        heat_stress_c = 30.0
        "#,
    )
    .unwrap();

    let config = AppConfig::load(Some(&config_path)).unwrap();
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.ingest.request_delay_ms, 500);

    let input = write_fixture(&dir, "enriched.json", &enriched_fixture());
    let scored = storage::score_records(storage::load_records(&input).unwrap(), &config.scoring);
    let metrics = scored[1].health_metrics.as_ref().unwrap();
    // 35 °C is now 5 degrees past heat stress
    assert_eq!(metrics.scores[&Factor::Temp], 50);
    assert!(metrics.insights.iter().any(|i| i.starts_with("High temperature")));
}

#[test]
fn invalid_config_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("bad.toml");
    fs::write(&config_path, "[scoring.thermal]\ncomfort_min_c = 30.0\n").unwrap();
    assert!(AppConfig::load(Some(&config_path)).is_err());
}

// ---------------------------------------------------------------------------
// Coverage
// ---------------------------------------------------------------------------

#[test]
fn coverage_over_persisted_batch() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "enriched.json", &enriched_fixture());
    let samples: Vec<_> = storage::load_records(&input)
        .unwrap()
        .into_iter()
        .filter_map(|r| r.environmental_data)
        .collect();

    let report = verify::coverage_report(&samples);
    assert_eq!(report.summary.total_samples, 3);
    assert_eq!(report.summary.samples_with_errors, 1);

    let temp = report.fields.iter().find(|f| f.field == "temperature_c").unwrap();
    assert_eq!(temp.present, 3);
    assert_eq!(temp.status, verify::VerificationStatus::Success);

    let o3 = report.factors.iter().find(|f| f.factor == "o3").unwrap();
    assert_eq!(o3.scorable, 0);
    assert_eq!(o3.status, verify::VerificationStatus::Failed);
}
