//! ONNX Inference Engine
//!
//! Loads the pre-trained plant health classifier with tract-onnx and exposes
//! it behind the [`PlantClassifier`] trait so callers can substitute fakes.

mod classifier;
mod engine;

pub use classifier::{check_probabilities, PlantClassifier, PlantHealth, Probabilities, CLASS_COUNT};
pub use engine::{load_classifier, OnnxClassifier};

use std::any::Any;

use thiserror::Error;

/// Errors during model loading or inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model file not found: {0}")]
    ModelNotFound(String),
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Model returned unknown label {0}")]
    InvalidLabel(i64),
    #[error("Invalid probability vector: {0}")]
    InvalidProbabilities(String),
    #[error("Classifier panicked: {0}")]
    Panicked(String),
}

/// Text of a caught panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
