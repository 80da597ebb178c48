//! Plant Health Labels and the Classifier Seam

use data_validator::NormalizedFeatures;
use serde::Serialize;

use crate::InferenceError;

/// Number of classes the model distinguishes
pub const CLASS_COUNT: usize = 3;

/// Per-class probabilities, indexed by [`PlantHealth::index`]
pub type Probabilities = [f64; CLASS_COUNT];

/// Health state reported for a plant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlantHealth {
    Happy,
    NeedsWater,
    Unhealthy,
}

impl PlantHealth {
    /// All labels in class-index order
    pub const ALL: [PlantHealth; CLASS_COUNT] =
        [PlantHealth::Happy, PlantHealth::NeedsWater, PlantHealth::Unhealthy];

    /// Class index used by the model and the wire format
    pub fn index(&self) -> u8 {
        match self {
            PlantHealth::Happy => 0,
            PlantHealth::NeedsWater => 1,
            PlantHealth::Unhealthy => 2,
        }
    }

    /// Human-readable message sent back to the device
    pub fn message(&self) -> &'static str {
        match self {
            PlantHealth::Happy => "Happy",
            PlantHealth::NeedsWater => "Needs Water",
            PlantHealth::Unhealthy => "Unhealthy",
        }
    }

    /// Label with the highest probability; ties go to the lower index
    pub fn argmax(probabilities: &Probabilities) -> PlantHealth {
        let mut best = 0;
        for (i, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = i;
            }
        }
        PlantHealth::ALL[best]
    }
}

impl TryFrom<i64> for PlantHealth {
    type Error = InferenceError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PlantHealth::Happy),
            1 => Ok(PlantHealth::NeedsWater),
            2 => Ok(PlantHealth::Unhealthy),
            other => Err(InferenceError::InvalidLabel(other)),
        }
    }
}

/// A pre-trained classifier over normalized sensor features.
///
/// Implementations are loaded once and shared read-only between requests.
pub trait PlantClassifier: Send + Sync {
    /// Predict the health label
    fn predict(&self, features: &NormalizedFeatures) -> Result<PlantHealth, InferenceError>;

    /// Predict per-class probabilities
    fn predict_probability(&self, features: &NormalizedFeatures) -> Result<Probabilities, InferenceError>;

    /// Predict the label and checked probabilities together.
    ///
    /// The default queries both methods; implementations that produce both
    /// from one forward pass should override it.
    fn predict_with_probability(
        &self,
        features: &NormalizedFeatures,
    ) -> Result<(PlantHealth, Probabilities), InferenceError> {
        let label = self.predict(features)?;
        let probabilities = check_probabilities(&self.predict_probability(features)?)?;
        Ok((label, probabilities))
    }

    /// Short description for logs and health output
    fn name(&self) -> &str {
        "classifier"
    }
}

/// Check a raw probability output and rescale it to sum to exactly 1.
///
/// Rejects wrong lengths, negative or non-finite entries, and zero mass.
pub fn check_probabilities(raw: &[f64]) -> Result<Probabilities, InferenceError> {
    if raw.len() != CLASS_COUNT {
        return Err(InferenceError::InvalidProbabilities(format!(
            "expected {} entries, got {}",
            CLASS_COUNT,
            raw.len()
        )));
    }
    if raw.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(InferenceError::InvalidProbabilities(format!(
            "entries must be finite and non-negative: {:?}",
            raw
        )));
    }

    let sum: f64 = raw.iter().sum();
    if sum <= 0.0 {
        return Err(InferenceError::InvalidProbabilities("entries sum to zero".to_string()));
    }

    Ok([raw[0] / sum, raw[1] / sum, raw[2] / sum])
}
