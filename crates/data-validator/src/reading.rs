//! Sensor Reading and Feature Vector Types

use serde::{Deserialize, Serialize};

/// Number of features fed to the classifier
pub const FEATURE_COUNT: usize = 5;

/// Feature names in the order both the classifier and the rule engine expect
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "soil_moisture",
    "light",
    "air_quality",
    "temperature",
    "humidity",
];

/// One raw reading from the plant's sensor board
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorReading {
    /// Capacitive soil moisture ADC value (higher = drier)
    pub soil_moisture: f64,
    /// Light sensor ADC value (0-4095)
    pub light: f64,
    /// Air quality sensor ADC value (0-4095)
    pub air_quality: f64,
    /// Air temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
}

/// Sensor values rescaled to [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFeatures {
    pub soil_moisture: f64,
    pub light: f64,
    pub air_quality: f64,
    pub temperature: f64,
    pub humidity: f64,
}

impl NormalizedFeatures {
    /// Features as an ordered array matching [`FEATURE_NAMES`]
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.soil_moisture,
            self.light,
            self.air_quality,
            self.temperature,
            self.humidity,
        ]
    }

    /// Features as `f32`, the element type of the model input tensor
    pub fn to_f32_array(&self) -> [f32; FEATURE_COUNT] {
        self.to_array().map(|v| v as f32)
    }
}

impl From<[f64; FEATURE_COUNT]> for NormalizedFeatures {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        let [soil_moisture, light, air_quality, temperature, humidity] = values;
        Self {
            soil_moisture,
            light,
            air_quality,
            temperature,
            humidity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_order_matches_names() {
        let features = NormalizedFeatures {
            soil_moisture: 0.1,
            light: 0.2,
            air_quality: 0.3,
            temperature: 0.4,
            humidity: 0.5,
        };

        assert_eq!(features.to_array(), [0.1, 0.2, 0.3, 0.4, 0.5]);
        assert_eq!(NormalizedFeatures::from(features.to_array()), features);
        assert_eq!(FEATURE_NAMES[3], "temperature");
    }
}
