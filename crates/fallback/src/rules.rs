//! Threshold Rules for Plant Health

use data_validator::NormalizedFeatures;
use inference_engine::PlantHealth;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Why the rule engine answered instead of the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FallbackReason {
    /// No classifier was loaded at startup
    NoModel,
    /// The classifier failed on this request
    ModelError,
}

impl FallbackReason {
    /// Note attached to fallback responses
    pub fn note(&self) -> &'static str {
        match self {
            FallbackReason::NoModel => "Used rule-based classification (no model available)",
            FallbackReason::ModelError => {
                "Used fallback rule-based classification due to model error"
            }
        }
    }
}

/// The rule that decided a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    /// Soil is too dry
    DrySoil,
    /// Temperature, humidity or air quality out of comfort band
    EnvironmentalStress,
    /// Too dark
    LowLight,
    /// Nothing fired
    Default,
}

impl Rule {
    /// Label the rule produces
    pub fn health(&self) -> PlantHealth {
        match self {
            Rule::DrySoil => PlantHealth::NeedsWater,
            Rule::EnvironmentalStress | Rule::LowLight => PlantHealth::Unhealthy,
            Rule::Default => PlantHealth::Happy,
        }
    }
}

/// Thresholds on normalized features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleThresholds {
    /// Soil moisture above this is dry
    pub soil_dry: f64,
    /// Temperature above this is too hot
    pub temperature_high: f64,
    /// Temperature below this is too cold
    pub temperature_low: f64,
    /// Humidity below this is too dry
    pub humidity_low: f64,
    /// Air quality above this is polluted
    pub air_quality_high: f64,
    /// Light below this is too dark
    pub light_low: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            soil_dry: 0.7,
            temperature_high: 0.8,
            temperature_low: 0.2,
            humidity_low: 0.3,
            air_quality_high: 0.7,
            light_low: 0.2,
        }
    }
}

/// Deterministic rule-based classifier.
///
/// Rules are checked in order and the first match wins: dry soil, then
/// environmental stress, then low light. A plant that is both dry and hot
/// is reported as needing water.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    thresholds: RuleThresholds,
}

impl RuleEngine {
    /// Create a rule engine with custom thresholds
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    /// Find the first rule that matches
    pub fn evaluate(&self, features: &NormalizedFeatures) -> Rule {
        let t = &self.thresholds;

        let rule = if features.soil_moisture > t.soil_dry {
            Rule::DrySoil
        } else if features.temperature > t.temperature_high
            || features.temperature < t.temperature_low
            || features.humidity < t.humidity_low
            || features.air_quality > t.air_quality_high
        {
            Rule::EnvironmentalStress
        } else if features.light < t.light_low {
            Rule::LowLight
        } else {
            Rule::Default
        };

        debug!("Fallback rule matched: {:?}", rule);
        rule
    }

    /// Classify normalized features
    pub fn classify(&self, features: &NormalizedFeatures) -> PlantHealth {
        self.evaluate(features).health()
    }
}
