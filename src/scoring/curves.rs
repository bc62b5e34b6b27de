//! Per-factor scoring curves.
//!
//! Each scorer maps one physical measurement (possibly absent) to an integer
//! risk score in [0, 100], higher meaning worse. All scorers are total:
//! a missing reading scores 0, and so does a malformed one (NaN, infinite,
//! or physically impossible such as a negative concentration). Arithmetic is
//! done in `f64` and the result is truncated toward zero, never rounded.

use crate::model::{EnvironmentalSample, Factor, FactorScores};
use crate::scoring::thresholds::ScoringConfig;

const MS_TO_KMH: f64 = 3.6;

// Curve slopes (score points per unit beyond a threshold).
const UV_MODERATE_SLOPE: f64 = 12.0;
const UV_MODERATE_CAP: f64 = 60.0;
const UV_VERY_HIGH_BASE: f64 = 80.0;
const UV_PEAK_DAY_BONUS: f64 = 20.0;
const HEAT_STRESS_SLOPE: f64 = 10.0;
const WARM_SLOPE: f64 = 5.0;
const COLD_STRESS_SLOPE: f64 = 8.0;
const COOL_SLOPE: f64 = 4.0;
const MILD_BAND_CAP: f64 = 50.0;
const RH_SLOPE: f64 = 2.0;
const DEWPOINT_SLOPE: f64 = 3.0;
const WIND_HAZARD_SLOPE: f64 = 5.0;
const WIND_DUSTY_SLOPE: f64 = 2.0;
const WIND_DUSTY_CAP: f64 = 50.0;
const HEAVY_RAIN_SLOPE: f64 = 2.0;

// ---------------------------------------------------------------------------
// Input sanitising
// ---------------------------------------------------------------------------

/// Converts a raw floating-point score into the [0, 100] integer range,
/// truncating toward zero.
fn to_score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    // `as` truncates toward zero after the clamp.
    raw.clamp(0.0, 100.0) as u8
}

/// A finite reading that may legitimately be negative (temperature, dew point).
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// A finite, non-negative magnitude (concentrations, UV, wind, rain).
fn magnitude(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

/// Simple linear ratio against a reference level: `min(100, v / reference * 100)`.
fn ratio_score(value: f64, reference: f64) -> f64 {
    (value / reference * 100.0).min(100.0)
}

// ---------------------------------------------------------------------------
// Pollutants
// ---------------------------------------------------------------------------

/// PM2.5 in µg/m³ against the WHO 24h guideline, with a 1.2× penalty once
/// the concentration exceeds the US AQI-100 reference.
pub fn score_pm25(pm25_ugm3: Option<f64>, config: &ScoringConfig) -> u8 {
    magnitude(pm25_ugm3)
        .map(|v| to_score(pm25_raw(v, config)))
        .unwrap_or(0)
}

fn pm25_raw(pm25: f64, config: &ScoringConfig) -> f64 {
    let g = &config.pollutants;
    let raw = ratio_score(pm25, g.pm25_24h_ugm3);
    if pm25 > g.pm25_aqi100_ugm3 {
        (raw * g.pm25_excess_multiplier).min(100.0)
    } else {
        raw
    }
}

/// Ozone in ppb against the 8h NAAQS; the curve steepens above its knee.
pub fn score_o3(o3_ppb: Option<f64>, config: &ScoringConfig) -> u8 {
    magnitude(o3_ppb)
        .map(|v| to_score(o3_raw(v, config)))
        .unwrap_or(0)
}

fn o3_raw(o3: f64, config: &ScoringConfig) -> f64 {
    let g = &config.pollutants;
    let raw = ratio_score(o3, g.o3_aqi100_ppb);
    if raw > g.o3_knee_score {
        (g.o3_knee_score + (raw - g.o3_knee_score) * g.o3_knee_slope).min(100.0)
    } else {
        raw
    }
}

pub fn score_no2(no2_ugm3: Option<f64>, config: &ScoringConfig) -> u8 {
    magnitude(no2_ugm3)
        .map(|v| to_score(ratio_score(v, config.pollutants.no2_annual_ugm3)))
        .unwrap_or(0)
}

pub fn score_so2(so2_ugm3: Option<f64>, config: &ScoringConfig) -> u8 {
    magnitude(so2_ugm3)
        .map(|v| to_score(ratio_score(v, config.pollutants.so2_24h_ugm3)))
        .unwrap_or(0)
}

pub fn score_co(co_ppm: Option<f64>, config: &ScoringConfig) -> u8 {
    magnitude(co_ppm)
        .map(|v| to_score(ratio_score(v, config.pollutants.co_24h_ppm)))
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// UV exposure. The daily maximum only adds a bonus on top of a current
/// reading; without `uv_index` the score is 0.
pub fn score_uv(uv_index: Option<f64>, uv_index_max: Option<f64>, config: &ScoringConfig) -> u8 {
    magnitude(uv_index)
        .map(|uv| to_score(uv_raw(uv, magnitude(uv_index_max), config)))
        .unwrap_or(0)
}

fn uv_raw(uv: f64, uv_max: Option<f64>, config: &ScoringConfig) -> f64 {
    let g = &config.uv;
    let base = if uv >= g.very_high {
        UV_VERY_HIGH_BASE
    } else if uv >= g.protect_threshold {
        ((uv - g.protect_threshold) * UV_MODERATE_SLOPE).min(UV_MODERATE_CAP)
    } else {
        0.0
    };
    if uv_max.is_some_and(|max| max >= g.very_high) {
        (base + UV_PEAK_DAY_BONUS).min(100.0)
    } else {
        base
    }
}

/// Heat and cold stress around the 18–24 °C comfort band, which scores 0.
pub fn score_temperature(temp_c: Option<f64>, config: &ScoringConfig) -> u8 {
    finite(temp_c)
        .map(|t| to_score(temperature_raw(t, config)))
        .unwrap_or(0)
}

fn temperature_raw(t: f64, config: &ScoringConfig) -> f64 {
    let g = &config.thermal;
    if t >= g.heat_stress_c {
        ((t - g.heat_stress_c) * HEAT_STRESS_SLOPE).min(100.0)
    } else if t > g.comfort_max_c {
        ((t - g.comfort_max_c) * WARM_SLOPE).min(MILD_BAND_CAP)
    } else if t <= g.cold_stress_c {
        ((g.cold_stress_c - t) * COLD_STRESS_SLOPE).min(100.0)
    } else if t < g.comfort_min_c {
        ((g.comfort_min_c - t) * COOL_SLOPE).min(MILD_BAND_CAP)
    } else {
        0.0
    }
}

/// Relative humidity outside 30–60 % plus an oppressive dew point term.
/// Both terms are non-negative and add up before the final clamp.
pub fn score_humidity_dew(
    humidity_pct: Option<f64>,
    dewpoint_c: Option<f64>,
    config: &ScoringConfig,
) -> u8 {
    let rh = humidity_pct.filter(|v| v.is_finite() && (0.0..=100.0).contains(v));
    to_score(humidity_dew_raw(rh, finite(dewpoint_c), config))
}

fn humidity_dew_raw(rh: Option<f64>, dew_c: Option<f64>, config: &ScoringConfig) -> f64 {
    let g = &config.humidity;
    let mut raw = 0.0;

    if let Some(rh) = rh {
        if rh < g.rh_low_pct {
            raw += (g.rh_low_pct - rh) * RH_SLOPE;
        } else if rh > g.rh_high_pct {
            raw += (rh - g.rh_high_pct) * RH_SLOPE;
        }
    }

    if let Some(dew_c) = dew_c {
        let dew_f = dew_c * 9.0 / 5.0 + 32.0;
        if dew_f >= g.dewpoint_oppressive_f {
            raw += (dew_f - g.dewpoint_oppressive_f) * DEWPOINT_SLOPE;
        }
    }

    raw
}

/// Wind speed in m/s, scored on km/h thresholds.
pub fn score_wind(wind_speed_ms: Option<f64>, config: &ScoringConfig) -> u8 {
    magnitude(wind_speed_ms)
        .map(|ms| to_score(wind_raw(ms, config)))
        .unwrap_or(0)
}

fn wind_raw(ms: f64, config: &ScoringConfig) -> f64 {
    let g = &config.wind;
    let kmh = ms * MS_TO_KMH;
    if kmh >= g.hazard_kmh {
        ((kmh - g.hazard_kmh) * WIND_HAZARD_SLOPE).min(100.0)
    } else if kmh >= g.dusty_kmh {
        ((kmh - g.dusty_kmh) * WIND_DUSTY_SLOPE).min(WIND_DUSTY_CAP)
    } else {
        0.0
    }
}

/// Daily precipitation in mm; only heavy rain (flood heuristic) scores.
pub fn score_precipitation(precip_mm: Option<f64>, config: &ScoringConfig) -> u8 {
    magnitude(precip_mm)
        .map(|mm| to_score(precipitation_raw(mm, config)))
        .unwrap_or(0)
}

fn precipitation_raw(mm: f64, config: &ScoringConfig) -> f64 {
    let heavy = config.precipitation.heavy_rain_mm_day;
    if mm >= heavy {
        ((mm - heavy) * HEAVY_RAIN_SLOPE).min(100.0)
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// All factors
// ---------------------------------------------------------------------------

/// Scores every factor for one sample. The result always holds all ten keys.
pub fn score_factors(sample: &EnvironmentalSample, config: &ScoringConfig) -> FactorScores {
    let p = &sample.pollutants;
    Factor::ALL
        .iter()
        .map(|&factor| {
            let score = match factor {
                Factor::Pm25 => score_pm25(p.pm25_ugm3, config),
                Factor::O3 => score_o3(p.o3_ppb, config),
                Factor::No2 => score_no2(p.no2_ugm3, config),
                Factor::So2 => score_so2(p.so2_ugm3, config),
                Factor::Co => score_co(p.co_ppm, config),
                Factor::Uv => score_uv(sample.uv_index, sample.uv_index_max, config),
                Factor::Temp => score_temperature(sample.temperature_c, config),
                Factor::HumidityDew => {
                    score_humidity_dew(sample.humidity_pct, sample.dewpoint_c, config)
                }
                Factor::Wind => score_wind(sample.wind_speed_ms, config),
                Factor::Precip => score_precipitation(sample.precipitation_mm, config),
            };
            (factor, score)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ScoringConfig {
        ScoringConfig::default()
    }

    // --- Missing input ------------------------------------------------------

    #[test]
    fn test_missing_input_scores_zero_for_every_factor() {
        let c = cfg();
        assert_eq!(score_pm25(None, &c), 0);
        assert_eq!(score_o3(None, &c), 0);
        assert_eq!(score_no2(None, &c), 0);
        assert_eq!(score_so2(None, &c), 0);
        assert_eq!(score_co(None, &c), 0);
        assert_eq!(score_uv(None, None, &c), 0);
        assert_eq!(score_temperature(None, &c), 0);
        assert_eq!(score_humidity_dew(None, None, &c), 0);
        assert_eq!(score_wind(None, &c), 0);
        assert_eq!(score_precipitation(None, &c), 0);
    }

    #[test]
    fn test_malformed_input_is_treated_as_missing() {
        let c = cfg();
        assert_eq!(score_pm25(Some(f64::NAN), &c), 0);
        assert_eq!(score_pm25(Some(-5.0), &c), 0);
        assert_eq!(score_o3(Some(f64::INFINITY), &c), 0);
        assert_eq!(score_wind(Some(-20.0), &c), 0);
        assert_eq!(score_precipitation(Some(f64::NEG_INFINITY), &c), 0);
        assert_eq!(score_temperature(Some(f64::NAN), &c), 0);
        // 150 % relative humidity is impossible; treated as absent.
        assert_eq!(score_humidity_dew(Some(150.0), None, &c), 0);
    }

    // --- PM2.5 --------------------------------------------------------------

    #[test]
    fn test_pm25_at_who_guideline_scores_100() {
        assert_eq!(score_pm25(Some(15.0), &cfg()), 100);
    }

    #[test]
    fn test_pm25_half_guideline_scores_50() {
        assert_eq!(score_pm25(Some(7.5), &cfg()), 50);
    }

    #[test]
    fn test_pm25_above_aqi100_stays_clamped() {
        assert_eq!(score_pm25(Some(40.0), &cfg()), 100);
    }

    #[test]
    fn test_pm25_excess_multiplier_applies_above_reference() {
        // With a loose guideline the 1.2x penalty becomes visible:
        // 40 / 100 * 100 = 40, then 40 * 1.2 = 48.
        let mut c = cfg();
        c.pollutants.pm25_24h_ugm3 = 100.0;
        assert_eq!(score_pm25(Some(40.0), &c), 48);
        assert_eq!(score_pm25(Some(30.0), &c), 30, "below 35 µg/m³ there is no penalty");
    }

    #[test]
    fn test_pm25_truncates_instead_of_rounding() {
        // 7.4 / 15 * 100 = 49.33..
        assert_eq!(score_pm25(Some(7.4), &cfg()), 49);
        // 7.49 / 15 * 100 = 49.93..
        assert_eq!(score_pm25(Some(7.49), &cfg()), 49);
    }

    // --- Gases --------------------------------------------------------------

    #[test]
    fn test_o3_below_knee_is_linear() {
        // 28 / 70 * 100 = 40
        assert_eq!(score_o3(Some(28.0), &cfg()), 40);
    }

    #[test]
    fn test_o3_above_knee_is_steeper() {
        // 49 / 70 * 100 = 70 -> 50 + 20 * 1.5 = 80
        assert_eq!(score_o3(Some(49.0), &cfg()), 80);
        assert_eq!(score_o3(Some(70.0), &cfg()), 100);
    }

    #[test]
    fn test_no2_so2_co_linear_ratios() {
        let c = cfg();
        assert_eq!(score_no2(Some(5.0), &c), 50);
        assert_eq!(score_no2(Some(25.0), &c), 100);
        assert_eq!(score_so2(Some(10.0), &c), 25);
        assert_eq!(score_co(Some(7.0), &c), 100);
        assert_eq!(score_co(Some(0.0), &c), 0);
    }

    // --- UV -----------------------------------------------------------------

    #[test]
    fn test_uv_bands() {
        let c = cfg();
        assert_eq!(score_uv(Some(2.0), None, &c), 0);
        assert_eq!(score_uv(Some(3.0), None, &c), 0);
        assert_eq!(score_uv(Some(5.0), None, &c), 24);
        assert_eq!(score_uv(Some(7.9), None, &c), 58);
        assert_eq!(score_uv(Some(8.0), None, &c), 80);
    }

    #[test]
    fn test_uv_peak_day_bonus() {
        let c = cfg();
        assert_eq!(score_uv(Some(9.0), Some(9.5), &c), 100);
        assert_eq!(score_uv(Some(5.0), Some(8.0), &c), 44);
        assert_eq!(score_uv(Some(5.0), Some(7.0), &c), 24);
    }

    #[test]
    fn test_uv_max_alone_does_not_score() {
        assert_eq!(score_uv(None, Some(11.0), &cfg()), 0);
    }

    // --- Temperature --------------------------------------------------------

    #[test]
    fn test_temperature_comfort_band_scores_zero() {
        let c = cfg();
        assert_eq!(score_temperature(Some(21.0), &c), 0);
        assert_eq!(score_temperature(Some(18.0), &c), 0);
        assert_eq!(score_temperature(Some(24.0), &c), 0);
    }

    #[test]
    fn test_temperature_heat_branches() {
        let c = cfg();
        assert_eq!(score_temperature(Some(32.0), &c), 0, "boundary of heat stress formula");
        assert_eq!(score_temperature(Some(35.0), &c), 30);
        assert_eq!(score_temperature(Some(42.0), &c), 100);
        assert_eq!(score_temperature(Some(28.0), &c), 20);
        assert_eq!(score_temperature(Some(31.9), &c), 39);
    }

    #[test]
    fn test_temperature_cold_branches() {
        let c = cfg();
        assert_eq!(score_temperature(Some(10.0), &c), 32);
        assert_eq!(score_temperature(Some(0.0), &c), 0);
        assert_eq!(score_temperature(Some(-5.0), &c), 40);
        assert_eq!(score_temperature(Some(-20.0), &c), 100);
    }

    // --- Humidity / dew point -----------------------------------------------

    #[test]
    fn test_humidity_outside_comfort_range() {
        let c = cfg();
        assert_eq!(score_humidity_dew(Some(45.0), None, &c), 0);
        assert_eq!(score_humidity_dew(Some(20.0), None, &c), 20);
        assert_eq!(score_humidity_dew(Some(90.0), None, &c), 60);
    }

    #[test]
    fn test_dewpoint_term_adds_to_humidity_term() {
        let c = cfg();
        // 25 °C dew point = 77 °F -> (77 - 70) * 3 = 21
        assert_eq!(score_humidity_dew(None, Some(25.0), &c), 21);
        assert_eq!(score_humidity_dew(Some(80.0), Some(25.0), &c), 61);
        assert_eq!(score_humidity_dew(Some(100.0), Some(30.0), &c), 100);
        assert_eq!(score_humidity_dew(None, Some(10.0), &c), 0);
    }

    // --- Wind and rain ------------------------------------------------------

    #[test]
    fn test_wind_converts_to_kmh() {
        let c = cfg();
        assert_eq!(score_wind(Some(5.0), &c), 0); // 18 km/h
        assert_eq!(score_wind(Some(10.0), &c), 12); // 36 km/h
        assert_eq!(score_wind(Some(20.0), &c), 60); // 72 km/h
        assert_eq!(score_wind(Some(40.0), &c), 100);
    }

    #[test]
    fn test_precipitation_only_heavy_rain_scores() {
        let c = cfg();
        assert_eq!(score_precipitation(Some(0.0), &c), 0);
        assert_eq!(score_precipitation(Some(49.9), &c), 0);
        assert_eq!(score_precipitation(Some(50.0), &c), 0);
        assert_eq!(score_precipitation(Some(75.0), &c), 50);
        assert_eq!(score_precipitation(Some(200.0), &c), 100);
    }

    // --- All factors --------------------------------------------------------

    #[test]
    fn test_score_factors_fills_every_key_for_empty_sample() {
        let scores = score_factors(&EnvironmentalSample::default(), &cfg());
        assert_eq!(scores.len(), Factor::ALL.len());
        assert!(scores.values().all(|s| *s == 0));
    }

    // --- Raw curves before the clamp ---------------------------------------

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn magnitude_curves_are_non_negative_before_clamp(v in 0.0..1.0e6f64, max in 0.0..20.0f64) {
            let c = cfg();
            prop_assert!(pm25_raw(v, &c) >= 0.0);
            prop_assert!(o3_raw(v, &c) >= 0.0);
            prop_assert!(ratio_score(v, c.pollutants.no2_annual_ugm3) >= 0.0);
            prop_assert!(ratio_score(v, c.pollutants.so2_24h_ugm3) >= 0.0);
            prop_assert!(ratio_score(v, c.pollutants.co_24h_ppm) >= 0.0);
            prop_assert!(uv_raw(v, None, &c) >= 0.0);
            prop_assert!(uv_raw(v, Some(max), &c) >= 0.0);
            prop_assert!(wind_raw(v, &c) >= 0.0);
            prop_assert!(precipitation_raw(v, &c) >= 0.0);
        }

        #[test]
        fn thermal_and_humidity_curves_are_non_negative_before_clamp(
            t in -1.0e6..1.0e6f64,
            rh in 0.0..=100.0f64,
            dew in -1.0e6..1.0e6f64,
        ) {
            let c = cfg();
            prop_assert!(temperature_raw(t, &c) >= 0.0);
            prop_assert!(humidity_dew_raw(Some(rh), None, &c) >= 0.0);
            prop_assert!(humidity_dew_raw(None, Some(dew), &c) >= 0.0);
            prop_assert!(humidity_dew_raw(Some(rh), Some(dew), &c) >= 0.0);
        }
    }
}
