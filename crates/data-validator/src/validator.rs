//! Request Validator for Sensor Readings

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ValidationError;
use crate::reading::{SensorReading, FEATURE_NAMES};

/// Fields every request must carry, in canonical order
pub const REQUIRED_FIELDS: [&str; 5] = FEATURE_NAMES;

/// Validates decoded request bodies before any classification happens
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Required fields absent from `body`, in canonical order
    pub fn missing_fields(&self, body: &Map<String, Value>) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| !body.contains_key(*field))
            .collect()
    }

    /// Turn a JSON body into a reading.
    ///
    /// Missing fields are all reported together; extra fields are ignored.
    pub fn validate(&self, body: &Value) -> Result<SensorReading, ValidationError> {
        let object = body.as_object().ok_or_else(|| {
            ValidationError::InvalidFormat("request body must be a JSON object".to_string())
        })?;

        let missing = self.missing_fields(object);
        if !missing.is_empty() {
            debug!("Rejecting reading, missing fields: {:?}", missing);
            return Err(ValidationError::MissingFields(missing));
        }

        Ok(SensorReading {
            soil_moisture: number_field(object, "soil_moisture")?,
            light: number_field(object, "light")?,
            air_quality: number_field(object, "air_quality")?,
            temperature: number_field(object, "temperature")?,
            humidity: number_field(object, "humidity")?,
        })
    }
}

fn number_field(object: &Map<String, Value>, field: &'static str) -> Result<f64, ValidationError> {
    object
        .get(field)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .ok_or(ValidationError::NotANumber(field))
}
