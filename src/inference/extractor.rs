//! Frozen feature-extraction network (ONNX).
//!
//! Produces a fixed-length vector per spatial cell; the spatial grid is
//! flattened into a single sequence for the downstream classifier.

use std::path::Path;
use std::sync::Mutex;

use ndarray::{Array3, Array4};
use ort::session::Session;

use super::InferenceError;

/// ONNX feature extractor with a mutex-serialized session.
///
/// `ort::Session::run` needs `&mut self`; the mutex makes the shared,
/// immutable-after-load session safe for concurrent requests at the cost of
/// serializing runs per model.
pub struct OnnxFeatureExtractor {
    session: Mutex<Session>,
}

impl OnnxFeatureExtractor {
    /// Load the frozen extractor from an ONNX artifact.
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

        tracing::info!("feature extractor loaded from {}", model_path.display());

        Ok(Self {
            session: Mutex::new(session),
        })
    }

    /// Run the extractor over a `[1, H, W, 3]` pixel tensor and flatten the
    /// resulting feature map to a `[1, cells, channels]` sequence.
    pub fn extract(&self, pixels: &Array4<f32>) -> Result<Array3<f32>, InferenceError> {
        use ort::value::TensorRef;

        let input = TensorRef::from_array_view(pixels)
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

        // Expect [1, d1, .., dk, channels]; cells = product of the middle dims.
        if shape.len() < 2 || shape[0] != 1 {
            return Err(InferenceError::UnexpectedShape(format!(
                "feature map shape {shape:?}, expected batch of one"
            )));
        }

        let channels = shape[shape.len() - 1] as usize;
        let cells: usize = (1..shape.len() - 1).map(|i| shape[i] as usize).product();
        if channels == 0 || cells == 0 || cells * channels != data.len() {
            return Err(InferenceError::UnexpectedShape(format!(
                "feature map shape {shape:?} does not cover {} values",
                data.len()
            )));
        }

        Array3::from_shape_vec((1, cells, channels), data.to_vec())
            .map_err(|e| InferenceError::UnexpectedShape(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_artifact_is_model_not_found() {
        let err = OnnxFeatureExtractor::load(Path::new("/nonexistent/extractor.onnx")).unwrap_err();
        assert!(matches!(err, InferenceError::ModelNotFound(_)));
    }

    #[test]
    fn corrupt_artifact_is_model_init_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not an onnx model").unwrap();
        let err = OnnxFeatureExtractor::load(file.path()).unwrap_err();
        assert!(matches!(err, InferenceError::ModelInit(_)));
    }
}
