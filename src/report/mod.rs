//! Report assembly — sanitized text plus the ECG image, rendered to PDF.

pub mod pdf;
pub mod sanitize;

pub use pdf::{render_report, ReportError};
