//! Classification Results

use fallback::FallbackReason;
use inference_engine::{InferenceError, PlantHealth, Probabilities};

/// Outcome of a single attempt on the model path
#[derive(Debug)]
pub enum ModelOutcome {
    /// The classifier answered with a label and a valid probability vector
    Predicted {
        label: PlantHealth,
        probabilities: Probabilities,
    },
    /// The classifier failed; the request should fall back
    Failed(InferenceError),
}

/// Final answer for one reading
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    /// Predicted health
    pub label: PlantHealth,
    /// Class probabilities, only present on the model path
    pub probabilities: Option<Probabilities>,
    /// Set when the rule engine answered
    pub fallback: Option<FallbackReason>,
}

impl ClassificationResult {
    /// Result produced by the model
    pub fn from_model(label: PlantHealth, probabilities: Probabilities) -> Self {
        Self {
            label,
            probabilities: Some(probabilities),
            fallback: None,
        }
    }

    /// Result produced by the rule engine
    pub fn from_rules(label: PlantHealth, reason: FallbackReason) -> Self {
        Self {
            label,
            probabilities: None,
            fallback: Some(reason),
        }
    }

    /// Note describing why the fallback was used
    pub fn note(&self) -> Option<&'static str> {
        self.fallback.map(|reason| reason.note())
    }

    /// Whether the rule engine produced this result
    pub fn used_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}
