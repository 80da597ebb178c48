//! Validation Error Types

use thiserror::Error;

/// Errors raised while turning a request body into a [`SensorReading`](crate::SensorReading)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// One or more required sensor fields are absent
    #[error("Missing required fields: {0:?}")]
    MissingFields(Vec<&'static str>),

    /// A sensor field is present but does not hold a finite number
    #[error("Field '{0}' must be a number")]
    NotANumber(&'static str),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl ValidationError {
    /// Fields reported missing, empty for every other variant
    pub fn missing_fields(&self) -> &[&'static str] {
        match self {
            ValidationError::MissingFields(fields) => fields,
            _ => &[],
        }
    }
}
