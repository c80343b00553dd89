//! Dosage forms, alternatives and age-based dosage status.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use rxverify_common::{ApiError, DosageProfile};
use serde::Serialize;

use crate::handlers::{json_body, PrescriptionRequest};
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct DosageResponse {
    pub message: String,
    pub results: Vec<DosageProfile>,
}

/// POST /dosage_alternatives - Per-drug dosage forms and branded alternatives
pub async fn dosage_alternatives(
    State(state): State<SharedState>,
    payload: Result<Json<PrescriptionRequest>, JsonRejection>,
) -> Result<Json<DosageResponse>, ApiError> {
    let req = json_body(payload)?;
    let age = req.age.ok_or_else(|| ApiError::bad_request("`age` is required"))?;
    let results = state.pipeline.analyze_dosage(&req.input()?, age).await?;
    Ok(Json(DosageResponse {
        message: "Dosage and alternatives checked successfully.".to_string(),
        results,
    }))
}
