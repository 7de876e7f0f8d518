//! cardiolens — ECG diagnostic report service.
//!
//! One synchronous pipeline per request: validate the multipart upload,
//! classify the waveform with a two-stage frozen-model pipeline, request a
//! clinical narrative from a generative-text service, and render everything
//! into a downloadable PDF report. Nothing is persisted across requests
//! beyond the preloaded model weights.

pub mod api;
pub mod config;
pub mod inference;
pub mod models;
pub mod narrative;
pub mod report;
pub mod staging;
