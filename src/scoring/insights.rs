//! Natural-language insights keyed off factor scores.
//!
//! Messages are emitted in a fixed order: PM2.5, ozone, UV, temperature,
//! humidity/dew point, then exactly one overall message chosen from the
//! composite score. A factor message only appears when its score reaches the
//! configured insight threshold (60 by default).

use crate::model::{EnvironmentalSample, Factor, FactorScores};
use crate::scoring::thresholds::ScoringConfig;

const OVERALL_VERY_HIGH: u8 = 80;
const OVERALL_HIGH: u8 = 60;
const OVERALL_MODERATE: u8 = 40;

pub fn generate_insights(
    scores: &FactorScores,
    composite: u8,
    sample: &EnvironmentalSample,
    config: &ScoringConfig,
) -> Vec<String> {
    let triggered = |factor: Factor| {
        scores.get(&factor).copied().unwrap_or(0) >= config.insight_threshold
    };
    let mut insights = Vec::new();

    if triggered(Factor::Pm25) {
        let pm25 = sample.pollutants.pm25_ugm3.unwrap_or(0.0);
        insights.push(format!(
            "PM2.5 levels elevated ({:.1} µg/m³). Consider reducing outdoor activities and using air purifiers indoors.",
            pm25
        ));
    }

    if triggered(Factor::O3) {
        let o3 = sample.pollutants.o3_ppb.unwrap_or(0.0);
        insights.push(format!(
            "Ozone levels high ({:.1} ppb). Afternoon outdoor activities may worsen breathing; morning exercise is safer.",
            o3
        ));
    }

    if triggered(Factor::Uv) {
        let uv = sample.uv_index.unwrap_or(0.0);
        insights.push(format!(
            "High UV exposure (UV Index {:.1}). Use sun protection, seek shade, and avoid midday sun exposure.",
            uv
        ));
    }

    if triggered(Factor::Temp) {
        let temp = sample.temperature_c.unwrap_or(0.0);
        if temp > config.thermal.comfort_max_c {
            insights.push(format!(
                "High temperature ({:.1}°C). Stay hydrated, seek air conditioning, and avoid strenuous outdoor activities.",
                temp
            ));
        } else {
            insights.push(format!(
                "Low temperature ({:.1}°C). Dress warmly and be aware of cold stress risks.",
                temp
            ));
        }
    }

    if triggered(Factor::HumidityDew) {
        let reading = match (sample.humidity_pct, sample.dewpoint_c) {
            (Some(rh), _) => format!("{:.1}%", rh),
            (None, Some(dew)) => format!("dew point {:.1}°C", dew),
            (None, None) => "n/a".to_string(),
        };
        insights.push(format!(
            "Humidity extremes detected ({}). High humidity impairs cooling; low humidity can cause respiratory irritation.",
            reading
        ));
    }

    insights.push(overall_message(composite).to_string());
    insights
}

/// The closing message, selected by composite score.
pub fn overall_message(composite: u8) -> &'static str {
    if composite >= OVERALL_VERY_HIGH {
        "Overall environmental health risk is very high. Consider limiting outdoor exposure and taking protective measures."
    } else if composite >= OVERALL_HIGH {
        "Moderate to high environmental health risk. Be cautious with outdoor activities and monitor symptoms."
    } else if composite >= OVERALL_MODERATE {
        "Some environmental health concerns present. Consider protective measures for sensitive individuals."
    } else {
        "Environmental conditions are generally favorable for health."
    }
}
