//! Frozen sequence classifier (ONNX).
//!
//! Consumes the extractor's feature sequence and yields a probability
//! distribution over the four diagnostic classes.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array3;
use ort::session::Session;

use super::InferenceError;

/// Number of diagnostic classes in the classifier head.
pub const NUM_CLASSES: usize = 4;

/// ONNX sequence classifier with a mutex-serialized session.
pub struct OnnxSequenceClassifier {
    session: Mutex<Session>,
}

impl OnnxSequenceClassifier {
    /// Load the frozen classifier from an ONNX artifact.
    pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
        if !model_path.exists() {
            return Err(InferenceError::ModelNotFound(model_path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e: ort::Error| InferenceError::ModelInit(e.to_string()))?
            .with_intra_threads(2)
            .map_err(|e: ort::Error| InferenceError::ModelInit(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e: ort::Error| InferenceError::ModelInit(format!("ONNX load failed: {e}")))?;

        tracing::info!("sequence classifier loaded from {}", model_path.display());

        Ok(Self {
            session: Mutex::new(session),
        })
    }

    /// Run the classifier over a `[1, cells, channels]` feature sequence.
    ///
    /// The output must flatten to exactly four probabilities — anything else
    /// means the artifact does not match the extractor it was trained on.
    pub fn classify(&self, features: &Array3<f32>) -> Result<[f32; NUM_CLASSES], InferenceError> {
        use ort::value::TensorRef;

        let input = TensorRef::from_array_view(features)
            .map_err(|e| InferenceError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::Inference("Session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| InferenceError::Inference(format!("ONNX inference failed: {e}")))?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Inference(format!("Output extraction: {e}")))?;

        if data.len() != NUM_CLASSES {
            return Err(InferenceError::UnexpectedShape(format!(
                "classifier output shape {shape:?}, expected {NUM_CLASSES} class probabilities"
            )));
        }

        let mut probs = [0.0f32; NUM_CLASSES];
        probs.copy_from_slice(data);
        Ok(probs)
    }
}
