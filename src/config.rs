//! Environment-driven service configuration.
//!
//! Everything the process needs is resolved once at startup: bind address,
//! model artifact paths, the upload spool directory, and the generative-text
//! service settings. The API credential is env-only — a missing key refuses
//! to start rather than falling back to anything embedded in source.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5001";
const DEFAULT_EXTRACTOR_MODEL: &str = "models/ecg_feature_extractor.onnx";
const DEFAULT_CLASSIFIER_MODEL: &str = "models/ecg_sequence_classifier.onnx";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_NARRATIVE_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_NARRATIVE_MODEL: &str = "gemini-1.5-flash-latest";
const DEFAULT_NARRATIVE_TIMEOUT_SECS: u64 = 60;

pub fn default_log_filter() -> &'static str {
    "info,cardiolens=debug"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set; the narrative service credential must come from the environment")]
    MissingApiKey,
    #[error("Invalid bind address `{0}`")]
    InvalidBindAddr(String),
    #[error("Invalid value `{value}` for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Generative-text service settings (Gemini-style `generateContent` API).
#[derive(Debug, Clone)]
pub struct NarrativeConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    /// Bound on the narrative call; a hung upstream must not hold the
    /// request forever.
    pub timeout_secs: u64,
}

/// Immutable-after-startup service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub extractor_model_path: PathBuf,
    pub classifier_model_path: PathBuf,
    pub upload_dir: PathBuf,
    pub narrative: NarrativeConfig,
}

impl Config {
    /// Resolve configuration from process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary lookup.
    ///
    /// Seam for tests — avoids mutating process env under a parallel test
    /// runner.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("ECG_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(bind_raw.clone()))?;

        let timeout_raw = lookup("ECG_NARRATIVE_TIMEOUT_SECS");
        let timeout_secs = match timeout_raw {
            Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: "ECG_NARRATIVE_TIMEOUT_SECS",
                value: raw,
            })?,
            None => DEFAULT_NARRATIVE_TIMEOUT_SECS,
        };

        let api_key = lookup("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(Self {
            bind_addr,
            extractor_model_path: lookup("ECG_EXTRACTOR_MODEL")
                .unwrap_or_else(|| DEFAULT_EXTRACTOR_MODEL.to_string())
                .into(),
            classifier_model_path: lookup("ECG_CLASSIFIER_MODEL")
                .unwrap_or_else(|| DEFAULT_CLASSIFIER_MODEL.to_string())
                .into(),
            upload_dir: lookup("ECG_UPLOAD_DIR")
                .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string())
                .into(),
            narrative: NarrativeConfig {
                base_url: lookup("GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_NARRATIVE_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_NARRATIVE_MODEL.to_string()),
                api_key,
                timeout_secs,
            },
        })
    }
}
