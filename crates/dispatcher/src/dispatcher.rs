//! Model-First Dispatcher with Rule-Based Fallback

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use data_validator::{NormalizedFeatures, Normalizer, SensorReading};
use fallback::{FallbackReason, RuleEngine};
use inference_engine::{panic_message, InferenceError, PlantClassifier};
use tracing::{debug, info, warn};

use crate::outcome::{ClassificationResult, ModelOutcome};

/// Runs exactly one classification path per reading.
///
/// The classifier is injected at construction and only read afterwards, so a
/// dispatcher can be shared between concurrent requests behind an `Arc`.
pub struct Dispatcher {
    /// Loaded classifier, `None` when running fallback-only
    classifier: Option<Arc<dyn PlantClassifier>>,
    /// Raw-to-feature mapping
    normalizer: Normalizer,
    /// Fallback policy
    rules: RuleEngine,
}

impl Dispatcher {
    /// Create a dispatcher around an optional classifier
    pub fn new(classifier: Option<Arc<dyn PlantClassifier>>) -> Self {
        if classifier.is_none() {
            info!("Dispatcher running with rule-based classification only");
        }

        Self {
            classifier,
            normalizer: Normalizer::default(),
            rules: RuleEngine::default(),
        }
    }

    /// Create a dispatcher that always uses the rule engine
    pub fn fallback_only() -> Self {
        Self::new(None)
    }

    /// Replace the fallback rule engine
    pub fn with_rules(mut self, rules: RuleEngine) -> Self {
        self.rules = rules;
        self
    }

    /// Whether a classifier was loaded
    pub fn has_model(&self) -> bool {
        self.classifier.is_some()
    }

    /// Name of the loaded classifier
    pub fn model_name(&self) -> Option<&str> {
        self.classifier.as_deref().map(|c| c.name())
    }

    /// Normalize a raw reading and classify it
    pub fn classify(&self, reading: &SensorReading) -> ClassificationResult {
        let features = self.normalizer.normalize(reading);
        debug!("Normalized features: {:?}", features.to_array());
        self.classify_features(&features)
    }

    /// Classify already-normalized features
    pub fn classify_features(&self, features: &NormalizedFeatures) -> ClassificationResult {
        let Some(classifier) = self.classifier.as_deref() else {
            return self.fallback(features, FallbackReason::NoModel);
        };

        match run_model(classifier, features) {
            ModelOutcome::Predicted { label, probabilities } => {
                info!("Prediction: {:?}, Probabilities: {:?}", label, probabilities);
                ClassificationResult::from_model(label, probabilities)
            }
            ModelOutcome::Failed(e) => {
                warn!("Error during prediction: {}", e);
                self.fallback(features, FallbackReason::ModelError)
            }
        }
    }

    fn fallback(&self, features: &NormalizedFeatures, reason: FallbackReason) -> ClassificationResult {
        let label = self.rules.classify(features);
        debug!("Rule-based classification ({:?}): {:?}", reason, label);
        ClassificationResult::from_rules(label, reason)
    }
}

/// Query the classifier once.
///
/// Errors and panics from the classifier both end up as
/// [`ModelOutcome::Failed`]; nothing escapes to the caller.
pub fn run_model(classifier: &dyn PlantClassifier, features: &NormalizedFeatures) -> ModelOutcome {
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
        classifier.predict_with_probability(features)
    }));

    match attempt {
        Ok(Ok((label, probabilities))) => ModelOutcome::Predicted { label, probabilities },
        Ok(Err(e)) => ModelOutcome::Failed(e),
        Err(payload) => ModelOutcome::Failed(InferenceError::Panicked(panic_message(payload.as_ref()))),
    }
}
