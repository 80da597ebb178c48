//! Data Validation and Normalization
//!
//! Provides request validation and fixed-range normalization for plant sensor readings.

mod error;
mod normalizer;
mod reading;
mod validator;

pub use error::ValidationError;
pub use normalizer::{Normalizer, SensorRange, SensorRanges};
pub use reading::{NormalizedFeatures, SensorReading, FEATURE_COUNT, FEATURE_NAMES};
pub use validator::{Validator, REQUIRED_FIELDS};
