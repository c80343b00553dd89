//! Prescription image OCR.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use rxverify_common::ApiError;
use rxverify_ingestion::decode_image_data;
use serde::{Deserialize, Serialize};

use crate::handlers::json_body;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub image_data: String,
}

#[derive(Debug, Serialize)]
pub struct OcrResponse {
    pub text: String,
}

/// POST /ocr_image - Extract text from a base64 prescription image
pub async fn ocr_image(
    State(state): State<SharedState>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<Json<OcrResponse>, ApiError> {
    let req = json_body(payload)?;
    let image = decode_image_data(&req.image_data)?;
    let text = state.pipeline.extract_text(image).await?;
    Ok(Json(OcrResponse { text }))
}
