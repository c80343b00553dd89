//! Axum router — maps all URL paths to handlers.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    analysis::{analyze_prescription, analyze_text},
    dosage::dosage_alternatives,
    interactions::check_interactions,
    ocr::ocr_image,
    system::health,
};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Verification API
        .route("/ocr_image",            post(ocr_image))
        .route("/check_interactions",   post(check_interactions))
        .route("/dosage_alternatives",  post(dosage_alternatives))

        // Combined analysis (form / multipart)
        .route("/analyze-text",         post(analyze_text))
        .route("/analyze-prescription", post(analyze_prescription))

        // System
        .route("/api/health",           get(health))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
