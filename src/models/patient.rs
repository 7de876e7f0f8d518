//! Patient metadata carried through one request.
//!
//! Free-text fields, presence-validated at ingress. Nothing is persisted
//! across requests.

use serde::Serialize;

/// Patient details supplied alongside the uploaded ECG image.
#[derive(Debug, Clone, Serialize)]
pub struct PatientInfo {
    pub name: String,
    pub age: String,
    pub gender: String,
}

impl PatientInfo {
    pub fn new(name: impl Into<String>, age: impl Into<String>, gender: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: age.into(),
            gender: gender.into(),
        }
    }

    /// Download filename for the report: `ECG_Report_<name>.pdf` with spaces
    /// as underscores. Characters that could break the Content-Disposition
    /// header (quotes, control chars, separators) are dropped.
    pub fn report_file_name(&self) -> String {
        let safe: String = self
            .name
            .trim()
            .chars()
            .map(|c| if c == ' ' { '_' } else { c })
            .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
            .collect();

        let stem = if safe.is_empty() { "patient".to_string() } else { safe };
        format!("ECG_Report_{stem}.pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_file_name_replaces_spaces() {
        let patient = PatientInfo::new("Jane Doe", "45", "female");
        assert_eq!(patient.report_file_name(), "ECG_Report_Jane_Doe.pdf");
    }

    #[test]
    fn report_file_name_strips_header_hostile_characters() {
        let patient = PatientInfo::new("Ja\"ne; Do\re\n", "45", "female");
        let name = patient.report_file_name();
        assert!(!name.contains('"'));
        assert!(!name.contains(';'));
        assert!(!name.contains('\r'));
        assert!(!name.contains('\n'));
        assert!(name.starts_with("ECG_Report_"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn report_file_name_empty_name_falls_back() {
        let patient = PatientInfo::new("   ", "45", "female");
        assert_eq!(patient.report_file_name(), "ECG_Report_patient.pdf");
    }
}
