//! ONNX Classifier Implementation

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use data_validator::{NormalizedFeatures, FEATURE_COUNT};
use tracing::{debug, error, info, warn};
use tract_onnx::prelude::*;

use crate::classifier::{check_probabilities, PlantClassifier, PlantHealth, Probabilities};
use crate::{panic_message, InferenceError};

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// Raw outputs of one forward pass
#[derive(Debug, Default)]
struct ModelOutput {
    /// Label tensor, when the graph exports one
    label: Option<i64>,
    /// Probability tensor, when the graph exports one
    probabilities: Option<Vec<f64>>,
}

impl ModelOutput {
    /// Checked probabilities; an error if the graph exports none
    fn probabilities(&self) -> Result<Probabilities, InferenceError> {
        let raw = self.probabilities.as_deref().ok_or_else(|| {
            InferenceError::InferenceFailed("model has no probability output".to_string())
        })?;
        check_probabilities(raw)
    }

    /// Exported label, or the argmax of the probabilities
    fn label(&self) -> Result<PlantHealth, InferenceError> {
        match (self.label, &self.probabilities) {
            (Some(label), _) => PlantHealth::try_from(label),
            (None, Some(_)) => Ok(PlantHealth::argmax(&self.probabilities()?)),
            (None, None) => Err(InferenceError::InferenceFailed(
                "model produced neither a label nor probabilities".to_string(),
            )),
        }
    }
}

/// Plant health classifier backed by an ONNX graph.
///
/// Expects a `[1, 5]` float input in feature order and returns an `i64`
/// label and/or a 3-entry float probability tensor, the layout scikit-learn
/// classifiers have when exported without a zipmap.
pub struct OnnxClassifier {
    /// Optimized execution plan
    plan: OnnxPlan,
    /// Model path
    model_path: String,
}

impl OnnxClassifier {
    /// Load and optimize the model at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let model_path = path.display().to_string();

        if !path.exists() {
            return Err(InferenceError::ModelNotFound(model_path));
        }

        info!("Loading classifier model from {}", model_path);

        // tract panics on some well-formed protobufs that are not valid ONNX
        let plan = panic::catch_unwind(AssertUnwindSafe(|| {
            tract_onnx::onnx()
                .model_for_path(path)
                .and_then(|model| model.with_input_fact(0, f32::fact([1, FEATURE_COUNT]).into()))
                .and_then(|model| model.into_optimized())
                .and_then(|model| model.into_runnable())
        }))
        .map_err(|payload| InferenceError::ModelLoadError(panic_message(payload.as_ref())))?
        .map_err(|e| InferenceError::ModelLoadError(e.to_string()))?;

        Ok(Self { plan, model_path })
    }

    /// Get model path
    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    fn run(&self, features: &NormalizedFeatures) -> Result<ModelOutput, InferenceError> {
        let input: Tensor = tract_ndarray::Array2::from_shape_vec(
            (1, FEATURE_COUNT),
            features.to_f32_array().to_vec(),
        )
        .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?
        .into();

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let mut result = ModelOutput::default();
        for output in outputs.iter() {
            match output.datum_type() {
                DatumType::I64 if result.label.is_none() => {
                    let view = output
                        .to_array_view::<i64>()
                        .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
                    result.label = view.iter().next().copied();
                }
                DatumType::F32 if result.probabilities.is_none() => {
                    let view = output
                        .to_array_view::<f32>()
                        .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
                    result.probabilities = Some(view.iter().map(|p| *p as f64).collect());
                }
                DatumType::F64 if result.probabilities.is_none() => {
                    let view = output
                        .to_array_view::<f64>()
                        .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
                    result.probabilities = Some(view.iter().copied().collect());
                }
                other => debug!("Ignoring model output of type {:?}", other),
            }
        }

        Ok(result)
    }
}

impl PlantClassifier for OnnxClassifier {
    fn predict(&self, features: &NormalizedFeatures) -> Result<PlantHealth, InferenceError> {
        self.run(features)?.label()
    }

    fn predict_probability(&self, features: &NormalizedFeatures) -> Result<Probabilities, InferenceError> {
        self.run(features)?.probabilities()
    }

    fn predict_with_probability(
        &self,
        features: &NormalizedFeatures,
    ) -> Result<(PlantHealth, Probabilities), InferenceError> {
        let output = self.run(features)?;
        Ok((output.label()?, output.probabilities()?))
    }

    fn name(&self) -> &str {
        &self.model_path
    }
}

/// Load the classifier at startup.
///
/// Never fails: an absent or broken artifact yields `None`, which routes
/// every request to the rule-based fallback for the process lifetime.
pub fn load_classifier(path: impl AsRef<Path>) -> Option<Arc<dyn PlantClassifier>> {
    match OnnxClassifier::load(path) {
        Ok(classifier) => {
            info!("Model loaded successfully from {}", classifier.model_path());
            Some(Arc::new(classifier))
        }
        Err(InferenceError::ModelNotFound(path)) => {
            warn!("Model file {} not found, running in fallback-only mode", path);
            None
        }
        Err(e) => {
            error!("Error loading model: {}, running in fallback-only mode", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;
    use tract_onnx::pb::{
        attribute_proto::AttributeType, tensor_proto::DataType, tensor_shape_proto, type_proto,
        AttributeProto, GraphProto, ModelProto, NodeProto, OperatorSetIdProto, TensorProto,
        TensorShapeProto, TypeProto, ValueInfoProto,
    };

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("{}-{}", std::process::id(), name))
    }

    fn features(soil: f64, light: f64) -> NormalizedFeatures {
        NormalizedFeatures {
            soil_moisture: soil,
            light,
            air_quality: 0.0,
            temperature: 0.0,
            humidity: 0.0,
        }
    }

    fn int_attr(name: &str, value: i64) -> AttributeProto {
        AttributeProto {
            name: name.to_string(),
            r#type: AttributeType::Int as i32,
            i: value,
            ..Default::default()
        }
    }

    fn node(op_type: &str, inputs: &[&str], output: &str, attribute: Vec<AttributeProto>) -> NodeProto {
        NodeProto {
            name: output.to_string(),
            op_type: op_type.to_string(),
            input: inputs.iter().map(|i| i.to_string()).collect(),
            output: vec![output.to_string()],
            attribute,
            ..Default::default()
        }
    }

    fn value_info(name: &str, elem_type: Option<DataType>) -> ValueInfoProto {
        ValueInfoProto {
            name: name.to_string(),
            r#type: elem_type.map(|elem_type| TypeProto {
                value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                    elem_type: elem_type as i32,
                    shape: Some(TensorShapeProto {
                        dim: [1, FEATURE_COUNT as i64]
                            .into_iter()
                            .map(|d| tensor_shape_proto::Dimension {
                                value: Some(tensor_shape_proto::dimension::Value::DimValue(d)),
                                ..Default::default()
                            })
                            .collect(),
                    }),
                })),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn write_model(name: &str, graph: GraphProto) -> std::path::PathBuf {
        let model = ModelProto {
            ir_version: 8,
            opset_import: vec![OperatorSetIdProto {
                domain: String::new(),
                version: 13,
            }],
            graph: Some(graph),
            ..Default::default()
        };

        let path = scratch_path(name);
        std::fs::write(&path, model.encode_to_vec()).unwrap();
        path
    }

    /// Softmax over `X · W`: soil moisture votes NeedsWater, light votes Happy.
    /// With `label_output` an ArgMax node also exports an int64 label.
    fn write_linear_model(name: &str, label_output: bool) -> std::path::PathBuf {
        #[rustfmt::skip]
        let weights = vec![
            0.0, 4.0, 0.0, // soil_moisture
            4.0, 0.0, 0.0, // light
            0.0, 0.0, 0.0, // air_quality
            0.0, 0.0, 0.0, // temperature
            0.0, 0.0, 0.0, // humidity
        ];

        let mut nodes = vec![
            node("MatMul", &["X", "W"], "logits", vec![]),
            node("Softmax", &["logits"], "probabilities", vec![int_attr("axis", 1)]),
        ];
        let mut outputs = vec![value_info("probabilities", None)];
        if label_output {
            nodes.push(node(
                "ArgMax",
                &["probabilities"],
                "label",
                vec![int_attr("axis", 1), int_attr("keepdims", 0)],
            ));
            outputs.insert(0, value_info("label", None));
        }

        write_model(
            name,
            GraphProto {
                name: "plant_health".to_string(),
                node: nodes,
                initializer: vec![TensorProto {
                    name: "W".to_string(),
                    dims: vec![FEATURE_COUNT as i64, 3],
                    data_type: DataType::Float as i32,
                    float_data: weights,
                    ..Default::default()
                }],
                input: vec![value_info("X", Some(DataType::Float))],
                output: outputs,
                ..Default::default()
            },
        )
    }

    fn assert_distribution(probs: &Probabilities) {
        assert_eq!(probs.len(), 3);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_model_file() {
        let path = scratch_path("does-not-exist.onnx");
        let err = OnnxClassifier::load(&path).err().unwrap();
        assert!(matches!(err, InferenceError::ModelNotFound(_)));
    }

    #[test]
    fn test_corrupt_model_file() {
        let path = scratch_path("corrupt.onnx");
        std::fs::write(&path, b"definitely not protobuf").unwrap();

        let err = OnnxClassifier::load(&path).err().unwrap();
        assert!(matches!(err, InferenceError::ModelLoadError(_)));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_classifier_falls_back_to_none() {
        assert!(load_classifier(scratch_path("absent.onnx")).is_none());
    }

    #[test]
    fn test_untyped_input_does_not_abort_startup() {
        let path = write_model(
            "untyped-input.onnx",
            GraphProto {
                name: "untyped".to_string(),
                node: vec![node("Softmax", &["X"], "probabilities", vec![int_attr("axis", 1)])],
                input: vec![value_info("X", None)],
                output: vec![value_info("probabilities", None)],
                ..Default::default()
            },
        );

        let err = OnnxClassifier::load(&path).err().unwrap();
        assert!(matches!(err, InferenceError::ModelLoadError(_)));
        assert!(load_classifier(&path).is_none());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_label_and_probability_outputs() {
        let path = write_linear_model("with-label.onnx", true);
        let classifier = OnnxClassifier::load(&path).unwrap();

        let dry = features(1.0, 0.0);
        assert_eq!(classifier.predict(&dry).unwrap(), PlantHealth::NeedsWater);

        let probs = classifier.predict_probability(&dry).unwrap();
        assert_distribution(&probs);
        assert!(probs[1] > 0.9);

        let (label, probs) = classifier.predict_with_probability(&features(0.0, 1.0)).unwrap();
        assert_eq!(label, PlantHealth::Happy);
        assert_distribution(&probs);
        assert_eq!(PlantHealth::argmax(&probs), PlantHealth::Happy);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_label_from_probabilities_only() {
        let path = write_linear_model("probabilities-only.onnx", false);
        let classifier = load_classifier(&path).unwrap();

        let (label, probs) = classifier.predict_with_probability(&features(1.0, 0.0)).unwrap();
        assert_eq!(label, PlantHealth::NeedsWater);
        assert_distribution(&probs);
        assert!((probs[0] - probs[2]).abs() < 1e-6);

        assert_eq!(classifier.predict(&features(0.0, 1.0)).unwrap(), PlantHealth::Happy);
        assert_eq!(classifier.name(), path.display().to_string());

        std::fs::remove_file(&path).unwrap();
    }
}
