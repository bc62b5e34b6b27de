//! Data coverage verification.
//!
//! Reports, for a batch of environmental samples, how many carry each
//! observable field and how many recorded upstream errors. Use this after an
//! enrichment run to see which sources are actually delivering data before
//! trusting the scores built on them.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::factors::{self, FACTOR_REGISTRY};
use crate::model::EnvironmentalSample;

// ============================================================================
// Coverage Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageReport {
    pub timestamp: String,
    pub fields: Vec<FieldCoverage>,
    pub factors: Vec<FactorCoverage>,
    pub summary: CoverageSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub total_samples: usize,
    pub samples_with_errors: usize,
    pub fields_complete: usize,
    pub fields_partial: usize,
    pub fields_missing: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldCoverage {
    pub field: String,
    pub present: usize,
    pub total: usize,
    pub status: VerificationStatus,
}

/// How many samples could feed a factor's scorer at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorCoverage {
    pub factor: String,
    pub name: String,
    pub unit: String,
    pub scorable: usize,
    pub status: VerificationStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

impl VerificationStatus {
    fn from_counts(present: usize, total: usize) -> Self {
        if total > 0 && present == total {
            VerificationStatus::Success
        } else if present > 0 {
            VerificationStatus::PartialSuccess
        } else {
            VerificationStatus::Failed
        }
    }
}

// ============================================================================
// Field lookup
// ============================================================================

fn field_present(sample: &EnvironmentalSample, field: &str) -> bool {
    let p = &sample.pollutants;
    match field {
        factors::FIELD_UV_INDEX => sample.uv_index.is_some(),
        factors::FIELD_UV_INDEX_MAX => sample.uv_index_max.is_some(),
        factors::FIELD_TEMPERATURE => sample.temperature_c.is_some(),
        factors::FIELD_HUMIDITY => sample.humidity_pct.is_some(),
        factors::FIELD_DEWPOINT => sample.dewpoint_c.is_some(),
        factors::FIELD_WIND_SPEED => sample.wind_speed_ms.is_some(),
        factors::FIELD_PRECIPITATION => sample.precipitation_mm.is_some(),
        factors::FIELD_AIR_QUALITY_INDEX => sample.air_quality_index.is_some(),
        factors::FIELD_PM25 => p.pm25_ugm3.is_some(),
        factors::FIELD_O3 => p.o3_ppb.is_some(),
        factors::FIELD_NO2 => p.no2_ugm3.is_some(),
        factors::FIELD_SO2 => p.so2_ugm3.is_some(),
        factors::FIELD_CO => p.co_ppm.is_some(),
        _ => false,
    }
}

// ============================================================================
// Report
// ============================================================================

pub fn coverage_report(samples: &[EnvironmentalSample]) -> CoverageReport {
    let total = samples.len();

    let fields: Vec<FieldCoverage> = factors::observed_fields()
        .into_iter()
        .map(|field| {
            let present = samples.iter().filter(|s| field_present(s, field)).count();
            FieldCoverage {
                field: field.to_string(),
                present,
                total,
                status: VerificationStatus::from_counts(present, total),
            }
        })
        .collect();

    let factor_rows = FACTOR_REGISTRY
        .iter()
        .map(|info| {
            let scorable = samples
                .iter()
                .filter(|s| info.input_fields.iter().any(|f| field_present(s, f)))
                .count();
            FactorCoverage {
                factor: info.factor.key().to_string(),
                name: info.name.to_string(),
                unit: info.unit.to_string(),
                scorable,
                status: VerificationStatus::from_counts(scorable, total),
            }
        })
        .collect();

    let count = |status: VerificationStatus| fields.iter().filter(|f| f.status == status).count();
    let summary = CoverageSummary {
        total_samples: total,
        samples_with_errors: samples.iter().filter(|s| !s.errors.is_empty()).count(),
        fields_complete: count(VerificationStatus::Success),
        fields_partial: count(VerificationStatus::PartialSuccess),
        fields_missing: count(VerificationStatus::Failed),
    };

    CoverageReport {
        timestamp: Utc::now().to_rfc3339(),
        fields,
        factors: factor_rows,
        summary,
    }
}

pub fn print_summary(report: &CoverageReport) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 COVERAGE SUMMARY");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    for factor in &report.factors {
        let marker = match factor.status {
            VerificationStatus::Success => "✓",
            VerificationStatus::PartialSuccess => "⚠",
            VerificationStatus::Failed => "✗",
        };
        let label = format!("{} [{}]", factor.name, factor.unit);
        println!(
            "  {} {:<46} {}/{} scorable",
            marker, label, factor.scorable, report.summary.total_samples
        );
    }
    println!();
    println!(
        "Fields: {} complete, {} partial, {} missing",
        report.summary.fields_complete, report.summary.fields_partial, report.summary.fields_missing
    );

    let error_rate = if report.summary.total_samples > 0 {
        (report.summary.samples_with_errors as f64 / report.summary.total_samples as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Samples with upstream errors: {:.1}% ({}/{})",
        error_rate, report.summary.samples_with_errors, report.summary.total_samples
    );
    println!("═══════════════════════════════════════════════════════════");
}
