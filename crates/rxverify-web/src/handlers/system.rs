//! Service health and collaborator status.

use axum::{extract::State, Json};
use chrono::Utc;
use rxverify_engine::pipeline::ModelsUsed;
use serde::Serialize;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: i64,
    pub interaction_records: usize,
    pub models_used: ModelsUsed,
}

/// GET /api/health
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        interaction_records: state.pipeline.dataset_len(),
        models_used: state.pipeline.models_used(),
    })
}
