//! Scoring thresholds and composite weights.
//!
//! Every threshold used by the factor curves, the composite aggregator and
//! the insight generator lives in one immutable `ScoringConfig` that is
//! passed by reference into the scoring functions. `ScoringConfig::default()`
//! carries the public-guideline values (WHO air quality guidelines, US AQI
//! breakpoints, common thermal comfort bands); a TOML `[scoring]` table can
//! override any subset of them.

use serde::{Deserialize, Serialize};

use crate::model::{Factor, HealthmarkError};

// ---------------------------------------------------------------------------
// Guideline groups
// ---------------------------------------------------------------------------

/// Air pollutant reference concentrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollutantGuidelines {
    /// WHO 24h PM2.5 guideline, µg/m³.
    pub pm25_24h_ugm3: f64,
    /// US 24h PM2.5 concentration at AQI 100, µg/m³.
    pub pm25_aqi100_ugm3: f64,
    /// Multiplier applied once PM2.5 exceeds the AQI-100 reference.
    pub pm25_excess_multiplier: f64,
    /// US 8h ozone NAAQS, ppb.
    pub o3_aqi100_ppb: f64,
    /// Ozone score above which the curve steepens.
    pub o3_knee_score: f64,
    pub o3_knee_slope: f64,
    /// WHO annual NO2 guideline, µg/m³.
    pub no2_annual_ugm3: f64,
    /// WHO 24h SO2 guideline, µg/m³.
    pub so2_24h_ugm3: f64,
    /// 24h CO guideline, ppm (about 4 mg/m³).
    pub co_24h_ppm: f64,
}

impl Default for PollutantGuidelines {
    fn default() -> Self {
        Self {
            pm25_24h_ugm3: 15.0,
            pm25_aqi100_ugm3: 35.0,
            pm25_excess_multiplier: 1.2,
            o3_aqi100_ppb: 70.0,
            o3_knee_score: 50.0,
            o3_knee_slope: 1.5,
            no2_annual_ugm3: 10.0,
            so2_24h_ugm3: 40.0,
            co_24h_ppm: 3.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UvGuidelines {
    /// UV index at or above which sun protection is advised.
    pub protect_threshold: f64,
    pub very_high: f64,
}

impl Default for UvGuidelines {
    fn default() -> Self {
        Self {
            protect_threshold: 3.0,
            very_high: 8.0,
        }
    }
}

/// Thermal comfort band and stress cutoffs, °C.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalGuidelines {
    pub comfort_min_c: f64,
    pub comfort_max_c: f64,
    pub heat_stress_c: f64,
    pub cold_stress_c: f64,
}

impl Default for ThermalGuidelines {
    fn default() -> Self {
        Self {
            comfort_min_c: 18.0,
            comfort_max_c: 24.0,
            heat_stress_c: 32.0,
            cold_stress_c: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumidityGuidelines {
    pub rh_low_pct: f64,
    pub rh_high_pct: f64,
    /// Dew point above which air feels oppressive, °F (~21.1 °C).
    pub dewpoint_oppressive_f: f64,
}

impl Default for HumidityGuidelines {
    fn default() -> Self {
        Self {
            rh_low_pct: 30.0,
            rh_high_pct: 60.0,
            dewpoint_oppressive_f: 70.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindGuidelines {
    /// Can loft dust given dry soils (~18 mph).
    pub dusty_kmh: f64,
    /// Tree limbs and debris become a hazard (~37 mph).
    pub hazard_kmh: f64,
}

impl Default for WindGuidelines {
    fn default() -> Self {
        Self {
            dusty_kmh: 30.0,
            hazard_kmh: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecipitationGuidelines {
    pub heavy_rain_mm_day: f64,
}

impl Default for PrecipitationGuidelines {
    fn default() -> Self {
        Self {
            heavy_rain_mm_day: 50.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Composite weights
// ---------------------------------------------------------------------------

/// Weight of each factor in the composite score. Defaults sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeWeights {
    pub pm25: f64,
    pub o3: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
    pub uv: f64,
    pub temp: f64,
    pub humidity_dew: f64,
    pub wind: f64,
    pub precip: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            pm25: 0.30,
            o3: 0.15,
            no2: 0.07,
            so2: 0.03,
            co: 0.03,
            uv: 0.20,
            temp: 0.12,
            humidity_dew: 0.06,
            wind: 0.02,
            precip: 0.02,
        }
    }
}

impl CompositeWeights {
    pub fn weight(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Pm25 => self.pm25,
            Factor::O3 => self.o3,
            Factor::No2 => self.no2,
            Factor::So2 => self.so2,
            Factor::Co => self.co,
            Factor::Uv => self.uv,
            Factor::Temp => self.temp,
            Factor::HumidityDew => self.humidity_dew,
            Factor::Wind => self.wind,
            Factor::Precip => self.precip,
        }
    }

    /// Sum of all weights, accumulated in `Factor::ALL` order.
    pub fn total(&self) -> f64 {
        Factor::ALL.iter().map(|f| self.weight(*f)).sum()
    }
}

// ---------------------------------------------------------------------------
// Scoring config
// ---------------------------------------------------------------------------

/// Complete, immutable parameter set for one scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub pollutants: PollutantGuidelines,
    pub uv: UvGuidelines,
    pub thermal: ThermalGuidelines,
    pub humidity: HumidityGuidelines,
    pub wind: WindGuidelines,
    pub precipitation: PrecipitationGuidelines,
    pub weights: CompositeWeights,
    /// Sub-score at or above which the severity kicker applies.
    pub severity_kicker_threshold: f64,
    /// Composite points added per sub-score point above the kicker threshold.
    pub severity_kicker_rate: f64,
    /// Factor applied to each observed field when upstream errors occurred.
    pub error_confidence_penalty: f64,
    /// Factor score at or above which an insight message is emitted.
    pub insight_threshold: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            pollutants: PollutantGuidelines::default(),
            uv: UvGuidelines::default(),
            thermal: ThermalGuidelines::default(),
            humidity: HumidityGuidelines::default(),
            wind: WindGuidelines::default(),
            precipitation: PrecipitationGuidelines::default(),
            weights: CompositeWeights::default(),
            severity_kicker_threshold: 80.0,
            severity_kicker_rate: 0.2,
            error_confidence_penalty: 0.7,
            insight_threshold: 60,
        }
    }
}

impl ScoringConfig {
    /// Checks internal consistency. Weights must be non-negative and sum to
    /// 1.0; reference concentrations must be positive; ordered thresholds
    /// must stay ordered.
    pub fn validate(&self) -> Result<(), HealthmarkError> {
        for factor in Factor::ALL {
            let w = self.weights.weight(factor);
            if !w.is_finite() || w < 0.0 {
                return Err(HealthmarkError::InvalidConfig(format!(
                    "weight for '{}' must be a non-negative number, got {}",
                    factor, w
                )));
            }
        }
        let total = self.weights.total();
        if (total - 1.0).abs() > 1e-6 {
            return Err(HealthmarkError::InvalidConfig(format!(
                "composite weights must sum to 1.0, got {:.4}",
                total
            )));
        }

        let p = &self.pollutants;
        let references = [
            ("pm25_24h_ugm3", p.pm25_24h_ugm3),
            ("pm25_aqi100_ugm3", p.pm25_aqi100_ugm3),
            ("o3_aqi100_ppb", p.o3_aqi100_ppb),
            ("no2_annual_ugm3", p.no2_annual_ugm3),
            ("so2_24h_ugm3", p.so2_24h_ugm3),
            ("co_24h_ppm", p.co_24h_ppm),
        ];
        for (name, value) in references {
            if !(value.is_finite() && value > 0.0) {
                return Err(HealthmarkError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let t = &self.thermal;
        if !(t.cold_stress_c < t.comfort_min_c
            && t.comfort_min_c < t.comfort_max_c
            && t.comfort_max_c < t.heat_stress_c)
        {
            return Err(HealthmarkError::InvalidConfig(
                "thermal thresholds must satisfy cold_stress < comfort_min < comfort_max < heat_stress"
                    .to_string(),
            ));
        }
        if self.uv.protect_threshold >= self.uv.very_high {
            return Err(HealthmarkError::InvalidConfig(
                "uv.protect_threshold must be below uv.very_high".to_string(),
            ));
        }
        if self.humidity.rh_low_pct >= self.humidity.rh_high_pct {
            return Err(HealthmarkError::InvalidConfig(
                "humidity.rh_low_pct must be below humidity.rh_high_pct".to_string(),
            ));
        }
        if self.wind.dusty_kmh >= self.wind.hazard_kmh {
            return Err(HealthmarkError::InvalidConfig(
                "wind.dusty_kmh must be below wind.hazard_kmh".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.error_confidence_penalty) {
            return Err(HealthmarkError::InvalidConfig(format!(
                "error_confidence_penalty must be within [0, 1], got {}",
                self.error_confidence_penalty
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
