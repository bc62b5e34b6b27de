//! Composite aggregation, confidence, risk categorisation and exposure flags.

use std::collections::BTreeMap;

use crate::model::{EnvironmentalSample, ExposureKind, Factor, FactorScores, RiskLevel};
use crate::scoring::thresholds::ScoringConfig;

/// Number of directly observable fields the confidence estimate is based on.
const OBSERVABLE_FIELDS: f64 = 6.0;

// ---------------------------------------------------------------------------
// Composite score
// ---------------------------------------------------------------------------

/// Weighted composite of all factor scores, with a severity kicker.
///
/// `base = Σ score·weight / Σ weight` over the factors present in `scores`.
/// When the worst sub-score reaches the kicker threshold (80), the composite
/// gains `rate · (max_sub − 80)` points so a single severe factor is not
/// diluted by the weights. The result is clamped to 100 and truncated.
pub fn composite_score(scores: &FactorScores, config: &ScoringConfig) -> u8 {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for factor in Factor::ALL {
        if let Some(&score) = scores.get(&factor) {
            let weight = config.weights.weight(factor);
            weighted_sum += f64::from(score) * weight;
            total_weight += weight;
        }
    }

    if total_weight <= 0.0 {
        return 0;
    }

    let mut base = weighted_sum / total_weight;

    let max_sub = f64::from(scores.values().copied().max().unwrap_or(0));
    if max_sub >= config.severity_kicker_threshold {
        base = (base + config.severity_kicker_rate * (max_sub - config.severity_kicker_threshold))
            .min(100.0);
    }

    base.clamp(0.0, 100.0) as u8
}

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

/// Fraction of the six observable fields (UV index, temperature, humidity,
/// AQI, wind speed, precipitation) that are present. Each present field is
/// discounted by the error penalty when the sample carries upstream errors.
pub fn confidence(sample: &EnvironmentalSample, config: &ScoringConfig) -> f64 {
    let present = [
        sample.uv_index.is_some(),
        sample.temperature_c.is_some(),
        sample.humidity_pct.is_some(),
        sample.air_quality_index.is_some(),
        sample.wind_speed_ms.is_some(),
        sample.precipitation_mm.is_some(),
    ];

    let per_field = if sample.errors.is_empty() {
        1.0
    } else {
        config.error_confidence_penalty
    };

    let sum: f64 = present
        .iter()
        .filter(|p| **p)
        .map(|_| per_field)
        .sum();

    (sum / OBSERVABLE_FIELDS).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Risk levels
// ---------------------------------------------------------------------------

/// Maps a score to its risk band. Bands are closed-open except the top one.
pub fn risk_level(score: u8) -> RiskLevel {
    match score {
        80..=u8::MAX => RiskLevel::VeryHigh,
        60..=79 => RiskLevel::High,
        40..=59 => RiskLevel::Moderate,
        20..=39 => RiskLevel::Low,
        _ => RiskLevel::Minimal,
    }
}

pub fn categorize_risk_levels(scores: &FactorScores) -> BTreeMap<Factor, RiskLevel> {
    scores
        .iter()
        .map(|(factor, score)| (*factor, risk_level(*score)))
        .collect()
}

// ---------------------------------------------------------------------------
// Exposure flags
// ---------------------------------------------------------------------------

/// Binary exposure flags for a single sample. An absent reading never sets
/// a flag.
pub fn exposure_flags(
    sample: &EnvironmentalSample,
    config: &ScoringConfig,
) -> BTreeMap<ExposureKind, u8> {
    let uv = sample.uv_index.filter(|v| v.is_finite());
    let temp = sample.temperature_c.filter(|v| v.is_finite());

    let flag = |condition: bool| u8::from(condition);

    BTreeMap::from([
        (
            ExposureKind::UvProtectionNeeded,
            flag(uv.is_some_and(|v| v >= config.uv.protect_threshold)),
        ),
        (
            ExposureKind::HeatStress,
            flag(temp.is_some_and(|t| t >= config.thermal.heat_stress_c)),
        ),
        (
            ExposureKind::ColdStress,
            flag(temp.is_some_and(|t| t <= config.thermal.cold_stress_c)),
        ),
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
