/// Health-exposure scoring engine.
///
/// Turns one `EnvironmentalSample` into one `HealthMetrics` record. Every
/// function here is pure and total: no I/O, no hidden state, no errors.
///
/// Submodules:
/// - `thresholds`: the injected `ScoringConfig` (guidelines and weights).
/// - `curves`: per-factor scoring curves.
/// - `composite`: composite score, confidence, risk bands, exposure flags.
/// - `insights`: natural-language explanations.

pub mod composite;
pub mod curves;
pub mod insights;
pub mod thresholds;

use rayon::prelude::*;

use crate::model::{EnvironmentalSample, HealthMetrics};

pub use thresholds::ScoringConfig;

/// Scores a sample with the default public-guideline thresholds.
pub fn score(sample: &EnvironmentalSample) -> HealthMetrics {
    score_with(sample, &ScoringConfig::default())
}

/// Scores a sample with an explicit configuration.
pub fn score_with(sample: &EnvironmentalSample, config: &ScoringConfig) -> HealthMetrics {
    let scores = curves::score_factors(sample, config);
    let composite_score = composite::composite_score(&scores, config);
    let confidence = composite::confidence(sample, config);
    let risk_levels = composite::categorize_risk_levels(&scores);
    let exposure_hours = composite::exposure_flags(sample, config);
    let insights = insights::generate_insights(&scores, composite_score, sample, config);

    HealthMetrics {
        scores,
        composite_score,
        confidence,
        risk_levels,
        exposure_hours,
        insights,
    }
}

/// Scores many samples in parallel. Output order matches input order.
pub fn score_batch(samples: &[EnvironmentalSample], config: &ScoringConfig) -> Vec<HealthMetrics> {
    samples
        .par_iter()
        .map(|sample| score_with(sample, config))
        .collect()
}
