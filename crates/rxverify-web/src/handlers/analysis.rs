//! Combined analysis from a text form or an uploaded file.

use axum::{
    extract::{rejection::FormRejection, Multipart, State},
    Form, Json,
};
use rxverify_common::ApiError;
use rxverify_engine::PrescriptionAnalysis;
use rxverify_ingestion::PrescriptionInput;
use serde::Deserialize;
use tracing::debug;

use crate::state::SharedState;

/// Age assumed when the client does not send one.
pub const DEFAULT_PATIENT_AGE: u32 = 30;

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextForm {
    pub text: String,
    #[serde(default)]
    pub patient_age: Option<u32>,
}

/// POST /analyze-text - Full analysis of typed prescription text
pub async fn analyze_text(
    State(state): State<SharedState>,
    form: Result<Form<AnalyzeTextForm>, FormRejection>,
) -> Result<Json<PrescriptionAnalysis>, ApiError> {
    let Form(form) = form.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let age = form.patient_age.unwrap_or(DEFAULT_PATIENT_AGE);
    let analysis = state.pipeline.analyze(&PrescriptionInput::Text(form.text), age).await?;
    Ok(Json(analysis))
}

/// POST /analyze-prescription - Full analysis of an uploaded image or text file
pub async fn analyze_prescription(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<PrescriptionAnalysis>, ApiError> {
    let mut input: Option<PrescriptionInput> = None;
    let mut age = DEFAULT_PATIENT_AGE;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let is_text = is_text_upload(field.content_type(), field.file_name());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                debug!(bytes = bytes.len(), is_text, "prescription upload received");
                input = Some(if is_text {
                    PrescriptionInput::Text(String::from_utf8_lossy(&bytes).into_owned())
                } else {
                    PrescriptionInput::Image(bytes.to_vec())
                });
            }
            Some("patient_age") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                age = raw
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::bad_request(format!("invalid patient_age: {}", raw)))?;
            }
            _ => {}
        }
    }

    let input = input.ok_or_else(|| ApiError::bad_request("multipart field `file` is required"))?;
    let analysis = state.pipeline.analyze(&input, age).await?;
    Ok(Json(analysis))
}

fn is_text_upload(content_type: Option<&str>, file_name: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.starts_with("text/"))
        || file_name.is_some_and(|name| name.to_lowercase().ends_with(".txt"))
}
