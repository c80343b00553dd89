//! Drug-drug interaction check.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use rxverify_common::{ApiError, InteractionResult, InteractionStatus};
use serde::Serialize;

use crate::handlers::{json_body, PrescriptionRequest};
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct InteractionsResponse {
    pub message: String,
    pub status: InteractionStatus,
    pub interactions: Vec<InteractionResult>,
}

/// POST /check_interactions - Pairwise interaction check for a prescription
pub async fn check_interactions(
    State(state): State<SharedState>,
    payload: Result<Json<PrescriptionRequest>, JsonRejection>,
) -> Result<Json<InteractionsResponse>, ApiError> {
    let req = json_body(payload)?;
    let report = state.pipeline.check_interactions(&req.input()?).await?;
    Ok(Json(InteractionsResponse {
        message: report.message().to_string(),
        status: report.status,
        interactions: report.interactions,
    }))
}
