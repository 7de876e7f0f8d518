//! Clinical narrative generation via an external generative-text service.
//!
//! The service receives one structured prompt and its free-text response is
//! passed through verbatim — the five expected sections are an instruction to
//! the model, never parsed or validated here. A service failure degrades to a
//! fixed fallback narrative instead of failing the report.

pub mod gemini;
pub mod prompt;

use crate::models::{DiagnosisLabel, PatientInfo};

pub use gemini::GeminiClient;

/// Narrative used when the generative service cannot be reached. The report
/// still ships; the notes section says why it is thin.
pub const FALLBACK_NARRATIVE: &str = "\
Automated clinical narrative generation was unavailable when this report was \
produced. The diagnosis and confidence above are unaffected. Please consult a \
licensed cardiologist for interpretation, recommended actions, and lifestyle \
guidance appropriate to this patient.";

#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("Cannot reach narrative service at {0}")]
    Connection(String),
    #[error("Narrative request timed out after {0}s")]
    Timeout(u64),
    #[error("Narrative service returned {status}: {body}")]
    Service { status: u16, body: String },
    #[error("Cannot parse narrative response: {0}")]
    ResponseParsing(String),
    #[error("Narrative service returned no text")]
    EmptyResponse,
}

/// The narrative seam the request handler depends on.
pub trait GenerateNarrative: Send + Sync {
    /// Produce the clinical narrative for one diagnosed patient.
    fn generate(
        &self,
        patient: &PatientInfo,
        label: DiagnosisLabel,
    ) -> Result<String, NarrativeError>;
}

/// Mock narrator for tests — fixed response or a forced service failure.
pub struct MockNarrator {
    response: Option<String>,
}

impl MockNarrator {
    pub fn returning(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { response: None }
    }
}

impl GenerateNarrative for MockNarrator {
    fn generate(
        &self,
        _patient: &PatientInfo,
        _label: DiagnosisLabel,
    ) -> Result<String, NarrativeError> {
        self.response
            .clone()
            .ok_or_else(|| NarrativeError::Connection("mock service down".to_string()))
    }
}
