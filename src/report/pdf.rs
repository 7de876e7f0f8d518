//! PDF rendering for the diagnostic report.
//!
//! A4 pages, built-in Helvetica fonts, manual y-cursor layout. Page one
//! carries the header, patient and diagnosis blocks and the clinical notes
//! (overflowing onto continuation pages as needed); the ECG image gets a
//! dedicated page with the disclaimer at its foot.

use std::io::BufWriter;
use std::path::Path;

use chrono::Local;
use printpdf::{
    BuiltinFont, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, IndirectFontRef, Mm,
    PdfDocument, PdfDocumentReference, PdfLayerReference, Px,
};

use super::sanitize::latin1_lossy;
use crate::models::{ClassificationResult, PatientInfo};

const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN: f64 = 20.0;
const PRINTABLE_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;
/// Notes flow to a new page below this line.
const BOTTOM_LIMIT: f64 = 30.0;
const TOP_CURSOR: f64 = PAGE_HEIGHT - 17.0;

/// Characters per wrapped notes line at 9pt Helvetica.
const WRAP_COLUMNS: usize = 95;

const DISCLAIMER: &str = "Note: This ECG report was generated with AI-assisted tools. \
Please consult a licensed cardiologist for interpretation and clinical decisions.";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("PDF font error: {0}")]
    Font(String),
    #[error("Cannot embed ECG image: {0}")]
    Image(String),
    #[error("PDF render error: {0}")]
    Render(String),
}

/// Render the complete diagnostic report to PDF bytes.
///
/// Idempotent for identical inputs up to the timestamp in the header:
/// the page count and section order never vary.
pub fn render_report(
    patient: &PatientInfo,
    result: &ClassificationResult,
    narrative: &str,
    image_path: &Path,
) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) = PdfDocument::new(
        "ECG Diagnostic Report",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Font(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Font(e.to_string()))?;
    let italic = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| ReportError::Font(e.to_string()))?;

    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut y = Mm(TOP_CURSOR);

    // ── Header ──────────────────────────────────────────────
    layer.use_text("ECG Diagnostic Report", 16.0, Mm(MARGIN), y, &bold);
    y -= Mm(7.0);
    let stamp = Local::now().format("%d %b %Y, %H:%M:%S").to_string();
    layer.use_text(&stamp, 10.0, Mm(MARGIN), y, &font);
    y -= Mm(10.0);

    // ── Patient information ─────────────────────────────────
    layer.use_text("Patient Information", 12.0, Mm(MARGIN), y, &bold);
    y -= Mm(7.0);
    field_row(&layer, &mut y, &font, "Name:", &latin1_lossy(&patient.name));
    field_row(
        &layer,
        &mut y,
        &font,
        "Age / Gender:",
        &format!(
            "{} / {}",
            latin1_lossy(&patient.age),
            latin1_lossy(&patient.gender)
        ),
    );
    y -= Mm(5.0);

    // ── Diagnosis ───────────────────────────────────────────
    layer.use_text("Diagnosis", 12.0, Mm(MARGIN), y, &bold);
    y -= Mm(7.0);
    field_row(
        &layer,
        &mut y,
        &font,
        "Condition:",
        &latin1_lossy(result.label.as_str()).to_uppercase(),
    );
    field_row(
        &layer,
        &mut y,
        &font,
        "Confidence:",
        &format!("{:.1}%", result.confidence),
    );
    y -= Mm(5.0);

    // ── Clinical notes & recommendations ────────────────────
    layer.use_text("Clinical Notes & Recommendations", 12.0, Mm(MARGIN), y, &bold);
    y -= Mm(7.0);
    let notes = latin1_lossy(narrative);
    for paragraph in notes.lines().filter(|l| !l.trim().is_empty()) {
        for line in wrap_text(paragraph.trim(), WRAP_COLUMNS) {
            if y < Mm(BOTTOM_LIMIT) {
                layer = new_page(&doc, &mut y);
            }
            layer.use_text(&line, 9.0, Mm(MARGIN), y, &font);
            y -= Mm(4.5);
        }
        y -= Mm(2.0);
    }

    // ── ECG image page ──────────────────────────────────────
    let image_layer = new_page(&doc, &mut y);
    image_layer.use_text("ECG Image", 14.0, Mm(MARGIN), y, &bold);
    y -= Mm(8.0);
    place_ecg_image(&image_layer, y, image_path)?;

    // Disclaimer at the foot of the image page.
    let mut footer_y = Mm(24.0);
    for line in wrap_text(DISCLAIMER, 100) {
        image_layer.use_text(&line, 9.0, Mm(MARGIN), footer_y, &italic);
        footer_y -= Mm(4.5);
    }

    let mut buffer = BufWriter::new(Vec::new());
    doc.save(&mut buffer)
        .map_err(|e| ReportError::Render(e.to_string()))?;
    buffer
        .into_inner()
        .map_err(|e| ReportError::Render(e.to_string()))
}

/// Label/value row at 12pt with a fixed label column.
fn field_row(
    layer: &PdfLayerReference,
    y: &mut Mm,
    font: &IndirectFontRef,
    label: &str,
    value: &str,
) {
    layer.use_text(label, 12.0, Mm(MARGIN), *y, font);
    layer.use_text(value, 12.0, Mm(MARGIN + 50.0), *y, font);
    *y -= Mm(6.0);
}

/// Start a fresh A4 page and reset the cursor.
fn new_page(doc: &PdfDocumentReference, y: &mut Mm) -> PdfLayerReference {
    let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    *y = Mm(TOP_CURSOR);
    doc.get_page(page).get_layer(layer)
}

/// Decode the staged upload and place it scaled to the printable width,
/// top edge at the current cursor.
fn place_ecg_image(
    layer: &PdfLayerReference,
    y: Mm,
    image_path: &Path,
) -> Result<(), ReportError> {
    const DPI: f64 = 300.0;
    const MM_PER_INCH: f64 = 25.4;

    let rgb = image::open(image_path)
        .map_err(|e| ReportError::Image(e.to_string()))?
        .to_rgb8();
    let (width_px, height_px) = rgb.dimensions();
    if width_px == 0 || height_px == 0 {
        return Err(ReportError::Image("empty image".to_string()));
    }

    let xobject = ImageXObject {
        width: Px(width_px as usize),
        height: Px(height_px as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: rgb.into_raw(),
        image_filter: None,
        smask: None,
        clipping_bbox: None,
    };

    // Natural size at 300 dpi, then scale to the printable width; shrink
    // further if the page cannot fit the height.
    let natural_w = width_px as f64 * MM_PER_INCH / DPI;
    let natural_h = height_px as f64 * MM_PER_INCH / DPI;
    let available_h = y.0 - BOTTOM_LIMIT;
    let scale = (PRINTABLE_WIDTH / natural_w).min(available_h / natural_h);

    Image::from(xobject).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN)),
            translate_y: Some(Mm(y.0 - natural_h * scale)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(DPI),
            ..Default::default()
        },
    );

    Ok(())
}

/// Greedy word wrap — same shape the appointment prep sheets use.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiagnosisLabel;
    use image::{Rgb, RgbImage};

    fn sample_image() -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        RgbImage::from_pixel(120, 80, Rgb([200, 40, 40]))
            .save_with_format(file.path(), image::ImageFormat::Png)
            .unwrap();
        file
    }

    fn sample_result() -> ClassificationResult {
        ClassificationResult {
            label: DiagnosisLabel::Mi,
            confidence: 82.0,
        }
    }

    fn sample_patient() -> PatientInfo {
        PatientInfo::new("Jane Doe", "45", "female")
    }

    fn occurrences(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    fn page_count(pdf: &[u8]) -> usize {
        // Page dictionaries are uncompressed; `/Page` also matches the
        // `/Pages` tree entries, so subtract those.
        occurrences(pdf, b"/Page") - occurrences(pdf, b"/Pages")
    }

    #[test]
    fn report_is_a_pdf_with_notes_and_image_pages() {
        let image = sample_image();
        let narrative = "1. Condition Summary: myocardial infarction.\n\n2. Key Symptoms:\n- chest pain";
        let pdf = render_report(&sample_patient(), &sample_result(), narrative, image.path())
            .unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        // Page 1 (header/diagnosis/notes) + dedicated image page.
        assert!(page_count(&pdf) >= 2);
    }

    #[test]
    fn structure_is_stable_for_identical_inputs() {
        let image = sample_image();
        let narrative = "Summary line.\nAnother line.";
        let a = render_report(&sample_patient(), &sample_result(), narrative, image.path())
            .unwrap();
        let b = render_report(&sample_patient(), &sample_result(), narrative, image.path())
            .unwrap();
        // Bytes may differ (timestamp); structure must not.
        assert_eq!(page_count(&a), page_count(&b));
    }

    #[test]
    fn long_narrative_flows_onto_continuation_pages() {
        let image = sample_image();
        let long_line = "The patient should maintain regular cardiology follow-up and monitoring. ";
        let narrative = long_line.repeat(120);
        let short = render_report(&sample_patient(), &sample_result(), "brief", image.path())
            .unwrap();
        let long = render_report(&sample_patient(), &sample_result(), &narrative, image.path())
            .unwrap();
        assert!(page_count(&long) > page_count(&short));
    }

    #[test]
    fn non_latin1_text_does_not_fail_assembly() {
        let image = sample_image();
        let patient = PatientInfo::new("山田太郎", "45", "女性");
        let narrative = "Résumé — 心電図 shows ST elevation \u{1F600}";
        let pdf = render_report(&patient, &sample_result(), narrative, image.path()).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn missing_image_is_an_image_error() {
        let err = render_report(
            &sample_patient(),
            &sample_result(),
            "notes",
            Path::new("/nonexistent/ecg.png"),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::Image(_)));
    }

    #[test]
    fn wrap_text_respects_column_limit() {
        let lines = wrap_text("alpha beta gamma delta epsilon", 12);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= 12));
    }

    #[test]
    fn wrap_text_keeps_overlong_words_whole() {
        let lines = wrap_text("supercalifragilisticexpialidocious ok", 10);
        assert_eq!(lines[0], "supercalifragilisticexpialidocious");
        assert_eq!(lines[1], "ok");
    }
}
