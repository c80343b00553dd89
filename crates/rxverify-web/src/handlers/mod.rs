//! HTTP handlers for all API routes.

pub mod analysis;
pub mod dosage;
pub mod interactions;
pub mod ocr;
pub mod system;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use rxverify_common::ApiError;
use rxverify_ingestion::PrescriptionInput;
use serde::Deserialize;

/// Body accepted by the verification endpoints: typed text or a base64 image.
#[derive(Debug, Default, Deserialize)]
pub struct PrescriptionRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
}

impl PrescriptionRequest {
    pub fn input(&self) -> Result<PrescriptionInput, ApiError> {
        Ok(PrescriptionInput::from_fields(self.text.clone(), self.image_data.clone())?)
    }
}

/// Unwrap a JSON body, reporting malformed payloads as 400 `{"detail": ..}`.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}
