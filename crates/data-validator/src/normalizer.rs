//! Fixed-Range Min-Max Normalization

use serde::{Deserialize, Serialize};

use crate::reading::{NormalizedFeatures, SensorReading};

/// Raw sensor span mapped onto [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorRange {
    pub min: f64,
    pub max: f64,
}

impl SensorRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Rescale `value` into [0, 1], clamping anything outside the span
    pub fn scale(&self, value: f64) -> f64 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

/// Raw ranges for each sensor, matching the preprocessing used at training time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorRanges {
    /// Soil moisture ADC (wet..dry)
    pub soil_moisture: SensorRange,
    /// Light ADC (12-bit)
    pub light: SensorRange,
    /// Air quality ADC (12-bit)
    pub air_quality: SensorRange,
    /// Temperature (°C)
    pub temperature: SensorRange,
    /// Relative humidity (%)
    pub humidity: SensorRange,
}

impl Default for SensorRanges {
    fn default() -> Self {
        Self {
            soil_moisture: SensorRange::new(1000.0, 3000.0),
            light: SensorRange::new(0.0, 4095.0),
            air_quality: SensorRange::new(0.0, 4095.0),
            temperature: SensorRange::new(15.0, 35.0),
            humidity: SensorRange::new(20.0, 90.0),
        }
    }
}

/// Maps raw readings to bounded features.
///
/// Out-of-range readings are clamped rather than rejected so that sensor
/// noise near the edges of a range never fails a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    ranges: SensorRanges,
}

impl Normalizer {
    /// Create a normalizer over custom ranges
    pub fn new(ranges: SensorRanges) -> Self {
        Self { ranges }
    }

    /// Normalize a reading
    pub fn normalize(&self, reading: &SensorReading) -> NormalizedFeatures {
        NormalizedFeatures {
            soil_moisture: self.ranges.soil_moisture.scale(reading.soil_moisture),
            light: self.ranges.light.scale(reading.light),
            air_quality: self.ranges.air_quality.scale(reading.air_quality),
            temperature: self.ranges.temperature.scale(reading.temperature),
            humidity: self.ranges.humidity.scale(reading.humidity),
        }
    }
}
