/// JSON persistence and batch processing of enriched location records.
///
/// Records move through three on-disk stages, each a JSON array of
/// `EnrichedRecord`: extracted locations (`date_str`, `lat`, `lon`), then
/// `environmental_data` attached by `enrich_locations`, then `health_metrics`
/// attached by `score_records`. Unknown keys survive every stage.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use rayon::prelude::*;

use crate::config::IngestConfig;
use crate::ingest::{environment, validate_coordinates};
use crate::logging::{self, Stage};
use crate::model::{EnrichedRecord, HealthmarkError, ScoredRecord};
use crate::scoring::{self, ScoringConfig};

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Reads a JSON array of records.
pub fn load_records(path: &Path) -> Result<Vec<EnrichedRecord>, HealthmarkError> {
    let contents = fs::read_to_string(path).map_err(|source| HealthmarkError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let records: Vec<EnrichedRecord> = serde_json::from_str(&contents)?;
    logging::debug(
        Stage::Storage,
        None,
        &format!("Loaded {} records from {}", records.len(), path.display()),
    );
    Ok(records)
}

/// Pretty-writes `records`, creating parent directories as needed.
pub fn save_records(path: &Path, records: &[EnrichedRecord]) -> Result<(), HealthmarkError> {
    write_json(path, records)?;
    logging::info(
        Stage::Storage,
        None,
        &format!("Saved {} records to {}", records.len(), path.display()),
    );
    Ok(())
}

/// Pretty-writes any serialisable value to `path`.
pub fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), HealthmarkError> {
    let io_err = |source| HealthmarkError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(io_err)
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parses a record date: `YYYY-MM-DD`, a full RFC 3339 timestamp, or any
/// string starting with `YYYY-MM-DD`.
pub fn parse_record_date(date_str: &str) -> Result<NaiveDate, HealthmarkError> {
    let s = date_str.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.date_naive());
    }
    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .ok_or_else(|| HealthmarkError::InvalidDate(date_str.to_string()))
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// Attaches `environmental_data` to up to `max_requests` records, pausing
/// `request_delay_ms` between lookups. Records without coordinates or a
/// parseable date are skipped with a warning; records past the request
/// budget are left untouched. Returns the number of records enriched.
pub fn enrich_locations(
    client: &reqwest::blocking::Client,
    records: &mut [EnrichedRecord],
    config: &IngestConfig,
) -> usize {
    let budget = records.len().min(config.max_requests);
    let delay = Duration::from_millis(config.request_delay_ms);
    let mut enriched = 0;

    logging::info(
        Stage::Ingest,
        None,
        &format!(
            "Enriching {} of {} locations (max_requests = {})",
            budget,
            records.len(),
            config.max_requests
        ),
    );

    for (i, record) in records.iter_mut().take(budget).enumerate() {
        let location = record.location_id();
        let target = match (record.lat, record.lon, record.date_str.as_deref()) {
            (Some(lat), Some(lon), Some(date_str)) => validate_coordinates(lat, lon)
                .and_then(|_| parse_record_date(date_str))
                .map(|day| (lat, lon, day)),
            _ => Err(HealthmarkError::NoDataAvailable(
                "missing lat, lon or date_str".to_string(),
            )),
        };

        let (lat, lon, day) = match target {
            Ok(t) => t,
            Err(e) => {
                logging::warn(Stage::Ingest, Some(&location), &format!("Skipping: {}", e));
                continue;
            }
        };

        logging::debug(
            Stage::Ingest,
            Some(&location),
            &format!("Fetching location {}/{}", i + 1, budget),
        );
        let sample = environment::fetch_environment(
            client,
            lat,
            lon,
            day,
            config.google_api_key.as_deref(),
        );
        logging::log_fetch_failures(&location, &sample.errors);
        record.environmental_data = Some(sample);
        enriched += 1;

        if i + 1 < budget && !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    logging::log_batch_summary(Stage::Ingest, budget, enriched, budget - enriched);
    enriched
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Attaches `health_metrics` to every record that has `environmental_data`,
/// in parallel. Records without it pass through unchanged. Order is kept.
pub fn score_records(records: Vec<EnrichedRecord>, config: &ScoringConfig) -> Vec<EnrichedRecord> {
    let total = records.len();
    let scored: Vec<EnrichedRecord> = records
        .into_par_iter()
        .map(|mut record| {
            if let Some(sample) = &record.environmental_data {
                record.health_metrics = Some(scoring::score_with(sample, config));
            }
            record
        })
        .collect();

    let successful = scored.iter().filter(|r| r.health_metrics.is_some()).count();
    logging::log_batch_summary(Stage::Scoring, total, successful, total - successful);
    scored
}

/// Binds scored records to their parsed date and coordinates for period
/// aggregation. Records lacking metrics, coordinates or a valid date are
/// skipped with a warning.
pub fn scored_records(records: &[EnrichedRecord]) -> Vec<ScoredRecord> {
    records
        .iter()
        .filter_map(|record| {
            let metrics = record.health_metrics.as_ref()?;
            let bound = match (record.lat, record.lon, record.date_str.as_deref()) {
                (Some(lat), Some(lon), Some(date_str)) => {
                    parse_record_date(date_str).map(|date| ScoredRecord {
                        date,
                        lat,
                        lon,
                        metrics: metrics.clone(),
                    })
                }
                _ => Err(HealthmarkError::NoDataAvailable(
                    "missing lat, lon or date_str".to_string(),
                )),
            };
            match bound {
                Ok(scored) => Some(scored),
                Err(e) => {
                    logging::warn(
                        Stage::Aggregation,
                        Some(&record.location_id()),
                        &format!("Excluded from summary: {}", e),
                    );
                    None
                }
            }
        })
        .collect()
}
