//! Two-stage frozen-model inference: feature extraction + sequence
//! classification.
//!
//! The split is deliberate and must be preserved: the sequence classifier was
//! trained on extracted feature sequences, not raw pixels, so the extractor's
//! output shape is the classifier's input contract. Both models are loaded
//! once at process start from ONNX artifacts and are read-only afterwards.

pub mod classifier;
pub mod extractor;
pub mod preprocess;

use std::path::Path;

use crate::models::ClassificationResult;

pub use classifier::OnnxSequenceClassifier;
pub use extractor::OnnxFeatureExtractor;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Cannot decode image: {0}")]
    ImageDecode(String),
    #[error("Model artifact not found: {0}")]
    ModelNotFound(std::path::PathBuf),
    #[error("Model initialization failed: {0}")]
    ModelInit(String),
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Unexpected tensor shape: {0}")]
    UnexpectedShape(String),
}

/// The classification seam the request handler depends on.
///
/// `EcgDiagnoser` is the real implementation; `MockDiagnoser` serves tests.
pub trait Diagnose: Send + Sync {
    fn diagnose(&self, image_path: &Path) -> Result<ClassificationResult, InferenceError>;
}

/// The production pipeline: preprocess → extract features → classify.
pub struct EcgDiagnoser {
    extractor: OnnxFeatureExtractor,
    classifier: OnnxSequenceClassifier,
}

impl EcgDiagnoser {
    pub fn new(extractor: OnnxFeatureExtractor, classifier: OnnxSequenceClassifier) -> Self {
        Self {
            extractor,
            classifier,
        }
    }

    /// Load both frozen models. Fails if either artifact is missing or
    /// corrupt — there is no partial-availability mode.
    pub fn load(extractor_path: &Path, classifier_path: &Path) -> Result<Self, InferenceError> {
        Ok(Self::new(
            OnnxFeatureExtractor::load(extractor_path)?,
            OnnxSequenceClassifier::load(classifier_path)?,
        ))
    }
}

impl Diagnose for EcgDiagnoser {
    fn diagnose(&self, image_path: &Path) -> Result<ClassificationResult, InferenceError> {
        let pixels = preprocess::image_tensor(image_path)?;
        let features = self.extractor.extract(&pixels)?;
        let probs = self.classifier.classify(&features)?;
        Ok(ClassificationResult::from_probabilities(&probs))
    }
}

/// Mock diagnoser for tests — fixed result or a forced decode failure.
pub struct MockDiagnoser {
    result: Option<ClassificationResult>,
}

impl MockDiagnoser {
    pub fn returning(result: ClassificationResult) -> Self {
        Self {
            result: Some(result),
        }
    }

    pub fn failing() -> Self {
        Self { result: None }
    }
}

impl Diagnose for MockDiagnoser {
    fn diagnose(&self, _image_path: &Path) -> Result<ClassificationResult, InferenceError> {
        self.result
            .ok_or_else(|| InferenceError::ImageDecode("mock decode failure".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiagnosisLabel;

    #[test]
    fn mock_returns_configured_result() {
        let mock = MockDiagnoser::returning(ClassificationResult {
            label: DiagnosisLabel::Mi,
            confidence: 82.0,
        });
        let result = mock.diagnose(Path::new("/nonexistent")).unwrap();
        assert_eq!(result.label, DiagnosisLabel::Mi);
    }

    #[test]
    fn mock_failure_maps_to_decode_error() {
        let mock = MockDiagnoser::failing();
        let err = mock.diagnose(Path::new("/nonexistent")).unwrap_err();
        assert!(matches!(err, InferenceError::ImageDecode(_)));
    }

    #[test]
    fn loading_missing_artifacts_fails() {
        let err = EcgDiagnoser::load(
            Path::new("/nonexistent/extractor.onnx"),
            Path::new("/nonexistent/classifier.onnx"),
        )
        .unwrap_err();
        assert!(matches!(err, InferenceError::ModelNotFound(_)));
    }
}
