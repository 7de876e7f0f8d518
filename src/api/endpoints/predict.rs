//! `POST /predict` — the full ingress → classify → narrate → assemble
//! pipeline for one uploaded ECG image.
//!
//! Validation happens before anything touches disk or a model. The staged
//! upload lives exactly as long as the request; inference, the narrative
//! call and PDF assembly are blocking work and run on the blocking pool.

use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::PatientInfo;
use crate::narrative::FALLBACK_NARRATIVE;
use crate::report::render_report;
use crate::staging::stage_upload;

/// Raw multipart fields, before validation.
#[derive(Default)]
struct PredictFields {
    image: Option<(String, Vec<u8>)>,
    name: Option<String>,
    age: Option<String>,
    gender: Option<String>,
}

/// `POST /predict` — multipart `image` + `name`, `age`, `gender`.
///
/// Returns the report as an `application/pdf` attachment named
/// `ECG_Report_<name>.pdf`.
pub async fn predict(
    State(ctx): State<ApiContext>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let fields = collect_fields(multipart).await?;
    let (file_name, image_bytes, patient) = validate(fields)?;

    let staged = stage_upload(&image_bytes, &file_name, &ctx.config.upload_dir)?;

    let diagnoser = ctx.diagnoser.clone();
    let narrator = ctx.narrator.clone();
    let blocking_patient = patient.clone();

    // Inference and the narrative call are blocking; keep them off the
    // async workers. `staged` moves in so the file outlives the pipeline
    // and is deleted when the closure finishes.
    let pdf = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ApiError> {
        let classification = diagnoser.diagnose(staged.path())?;
        tracing::info!(
            label = %classification.label,
            confidence = classification.confidence,
            "ECG classified"
        );

        let narrative = match narrator.generate(&blocking_patient, classification.label) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "narrative generation failed, using fallback");
                FALLBACK_NARRATIVE.to_string()
            }
        };

        Ok(render_report(
            &blocking_patient,
            &classification,
            &narrative,
            staged.path(),
        )?)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("pipeline task failed: {e}")))??;

    let disposition = format!("attachment; filename=\"{}\"", patient.report_file_name());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

/// Drain the multipart stream into named fields.
async fn collect_fields(mut multipart: Multipart) -> Result<PredictFields, ApiError> {
    let mut fields = PredictFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart request: {e}")))?
    {
        // Owned copy first — reading the field body consumes it.
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Cannot read `image` field: {e}")))?;
                fields.image = Some((file_name, bytes.to_vec()));
            }
            "name" => fields.name = Some(read_text(field, "name").await?),
            "age" => fields.age = Some(read_text(field, "age").await?),
            "gender" => fields.gender = Some(read_text(field, "gender").await?),
            // Unknown fields are ignored, matching the permissive ingress.
            _ => {}
        }
    }

    Ok(fields)
}

async fn read_text(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Cannot read `{name}` field: {e}")))
}

/// Reject before any file is persisted or model invoked.
///
/// The image check comes first; empty metadata counts as missing.
fn validate(fields: PredictFields) -> Result<(String, Vec<u8>, PatientInfo), ApiError> {
    let (file_name, bytes) = fields
        .image
        .ok_or_else(|| ApiError::BadRequest("Missing `image` field".to_string()))?;

    let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    match (
        present(fields.name),
        present(fields.age),
        present(fields.gender),
    ) {
        (Some(name), Some(age), Some(gender)) => {
            Ok((file_name, bytes, PatientInfo::new(name, age, gender)))
        }
        _ => Err(ApiError::BadRequest(
            "Missing patient info (name, age, gender)".to_string(),
        )),
    }
}
