//! Lossy Latin-1 sanitization for PDF text.
//!
//! The report uses the built-in Helvetica fonts, which are single-byte
//! encoded — anything outside Latin-1 cannot be represented and becomes `?`.
//! This step must never fail: whatever the narrative service or the patient
//! fields contain, assembly continues.

/// Replace every character outside Latin-1 with `?`.
///
/// Control characters other than newline and tab are dropped so stray bytes
/// cannot corrupt the content stream.
pub fn latin1_lossy(text: &str) -> String {
    text.chars()
        .filter_map(|c| {
            if c == '\n' || c == '\t' {
                Some(c)
            } else if c.is_control() {
                None
            } else if (c as u32) <= 0xFF {
                Some(c)
            } else {
                Some('?')
            }
        })
        .collect()
}
