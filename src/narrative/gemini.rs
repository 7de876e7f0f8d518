//! HTTP client for the Gemini `generateContent` REST surface.
//!
//! Blocking client with a bounded timeout; invoked from the async handler
//! through `spawn_blocking`. The API key comes from configuration and is sent
//! as a request header, never logged and never part of the URL.

use serde::{Deserialize, Serialize};

use super::prompt::build_report_prompt;
use super::{GenerateNarrative, NarrativeError};
use crate::config::NarrativeConfig;
use crate::models::{DiagnosisLabel, PatientInfo};

/// Gemini-style generative-text client.
///
/// The blocking HTTP client is built per call, inside the blocking context
/// that runs it — this type itself holds no runtime state.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(config: &NarrativeConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one prompt and return the completion text verbatim.
    pub fn generate_text(&self, prompt: &str) -> Result<String, NarrativeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| NarrativeError::Connection(e.to_string()))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    NarrativeError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    NarrativeError::Timeout(self.timeout_secs)
                } else {
                    NarrativeError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(NarrativeError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| NarrativeError::ResponseParsing(e.to_string()))?;

        extract_text(&parsed)
    }
}

impl GenerateNarrative for GeminiClient {
    fn generate(
        &self,
        patient: &PatientInfo,
        label: DiagnosisLabel,
    ) -> Result<String, NarrativeError> {
        self.generate_text(&build_report_prompt(patient, label))
    }
}

// ── Wire format ─────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

/// Join the parts of the first candidate into one narrative string.
fn extract_text(response: &GenerateContentResponse) -> Result<String, NarrativeError> {
    let candidate = response
        .candidates
        .first()
        .ok_or(NarrativeError::EmptyResponse)?;

    let text = candidate
        .content
        .parts
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(NarrativeError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(base_url: &str, timeout_secs: u64) -> NarrativeConfig {
        NarrativeConfig {
            base_url: base_url.to_string(),
            model: "gemini-1.5-flash-latest".to_string(),
            api_key: "test-key".to_string(),
            timeout_secs,
        }
    }

    #[test]
    fn extract_text_joins_candidate_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"1. Condition Summary\n"},{"text":"2. Key Symptoms"}]}}]}"#,
        )
        .unwrap();
        let text = extract_text(&response).unwrap();
        assert_eq!(text, "1. Condition Summary\n2. Key Symptoms");
    }

    #[test]
    fn extract_text_without_candidates_is_empty_response() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(matches!(
            extract_text(&response),
            Err(NarrativeError::EmptyResponse)
        ));
    }

    #[test]
    fn extract_text_with_blank_parts_is_empty_response() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"  \n"}]}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            extract_text(&response),
            Err(NarrativeError::EmptyResponse)
        ));
    }

    #[test]
    fn request_serializes_to_generate_content_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "prompt".to_string(),
                }],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
    }

    #[test]
    fn unreachable_service_maps_to_connection_error() {
        // Port 9 (discard) — nothing listens there.
        let client = GeminiClient::new(&test_config("http://127.0.0.1:9", 2));
        let err = client.generate_text("prompt").unwrap_err();
        assert!(matches!(
            err,
            NarrativeError::Connection(_) | NarrativeError::Timeout(_)
        ));
    }

    #[test]
    fn client_normalizes_trailing_slash() {
        let client = GeminiClient::new(&test_config("http://localhost:8080/", 5));
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
