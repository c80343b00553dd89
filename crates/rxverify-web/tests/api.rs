//! Router-level tests driving the API with in-memory collaborators.
//!
//! Run with: cargo test --package rxverify-web --test api

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use rxverify_common::InteractionRecord;
use rxverify_engine::{AgeKeywordPolicy, DosageEngine, IdentifierResolver, InteractionEngine, PrescriptionPipeline};
use rxverify_ingestion::{InteractionDataset, MockDrugSource, PlaceholderOcr, TextNormalizer};
use rxverify_llm::KeywordRiskSummarizer;
use rxverify_ner::{DictionaryNer, DrugExtractor, FixedExtractor};
use rxverify_web::{router::build_router, state::AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app_with(extractor: Arc<dyn DrugExtractor>) -> Router {
    let source = Arc::new(
        MockDrugSource::new()
            .with("Paracetamol", "161")
            .with("Warfarin", "11289")
            .with_dosage_forms("11289", &["warfarin sodium 5 MG Oral Tablet"])
            .with_ingredient("11289", "11289")
            .with_branded("11289", &["Coumadin 5 MG Oral Tablet"]),
    );
    let dataset = InteractionDataset::from_records(vec![InteractionRecord {
        rxcui_a: "161".into(),
        rxcui_b: "11289".into(),
        drug_a: "Acetaminophen".into(),
        drug_b: "Warfarin".into(),
        description: "May increase risk of bleeding".into(),
    }]);
    let pipeline = PrescriptionPipeline::new(
        TextNormalizer::new(Arc::new(PlaceholderOcr)),
        extractor,
        IdentifierResolver::new(source.clone(), 32),
        InteractionEngine::new(Arc::new(dataset), Arc::new(KeywordRiskSummarizer)),
        DosageEngine::new(source, Arc::new(AgeKeywordPolicy::default())),
    );
    build_router(AppState::new(pipeline))
}

fn app() -> Router {
    app_with(Arc::new(DictionaryNer::with_embedded_list().unwrap()))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_check_interactions_severe() {
    let (status, body) = send(
        app(),
        post_json("/check_interactions", json!({"text": "Take Paracetamol 500mg and Warfarin 10mg daily."})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Interactions checked successfully.");
    assert_eq!(body["status"], "checked");
    let hits = body["interactions"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["drug1"], "Acetaminophen");
    assert_eq!(hits[0]["rxcui2"], "11289");
    assert_eq!(hits[0]["alert_level"], "severe");
}

#[tokio::test]
async fn test_check_interactions_single_drug() {
    let (status, body) = send(app(), post_json("/check_interactions", json!({"text": "Warfarin 5mg"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "insufficient_drugs");
    assert_eq!(body["message"], "Not enough drugs with RxCUIs found to check for interactions.");
    assert!(body["interactions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_no_drugs_is_404() {
    let empty = Arc::new(FixedExtractor::new(Vec::<String>::new()));
    let (status, body) = send(app_with(empty.clone()), post_json("/check_interactions", json!({"text": "rest"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No drugs found in the prescription.");

    let (status, _) = send(app_with(empty), post_json("/dosage_alternatives", json!({"text": "rest", "age": 40}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dosage_alternatives_elderly() {
    let (status, body) = send(
        app(),
        post_json("/dosage_alternatives", json!({"text": "Warfarin 5mg tablet", "age": 70})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Dosage and alternatives checked successfully.");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["drug"], "Warfarin");
    assert_eq!(results[0]["dosage_status"], "Monitor closely for elderly patients.");
    assert_eq!(results[0]["alternatives"][0], "Coumadin 5 MG Oral Tablet");
}

#[tokio::test]
async fn test_dosage_alternatives_requires_age() {
    let (status, body) = send(app(), post_json("/dosage_alternatives", json!({"text": "Warfarin"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("age"));
}

#[tokio::test]
async fn test_image_data_goes_through_ocr() {
    // base64("fake image")
    let (status, body) = send(app(), post_json("/ocr_image", json!({"image_data": "ZmFrZSBpbWFnZQ=="}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["text"].as_str().unwrap().starts_with("Paracetamol 500mg"));

    let (status, body) = send(
        app(),
        post_json("/check_interactions", json!({"image_data": "ZmFrZSBpbWFnZQ=="})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_bad_input_is_400() {
    let (status, _) = send(app(), post_json("/ocr_image", json!({"image_data": "@@not base64@@"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app(), post_json("/check_interactions", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = Request::builder()
        .method("POST")
        .uri("/check_interactions")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_analyze_text_form() {
    let req = Request::builder()
        .method("POST")
        .uri("/analyze-text")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("text=Paracetamol+500mg+tablet+and+Warfarin&patient_age=10"))
        .unwrap();
    let (status, body) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verification_status"], "processed");
    assert_eq!(body["patient_age"], 10);
    assert_eq!(body["medical_entities"][0]["entity_group"], "MEDICINE");
    assert_eq!(body["interactions"]["interactions"][0]["alert_level"], "severe");
    assert_eq!(body["dosage"][0]["dosage_status"], "May need dosage adjustment for children.");
    assert_eq!(body["models_used"]["ner"], "dictionary");
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn test_analyze_prescription_text_file() {
    let boundary = "rxverify-boundary";
    let multipart = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"patient_age\"\r\n\r\n70\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"rx.txt\"\r\n\
         Content-Type: text/plain\r\n\r\nWarfarin 5mg daily\r\n--{b}--\r\n",
        b = boundary
    );
    let req = Request::builder()
        .method("POST")
        .uri("/analyze-prescription")
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(multipart))
        .unwrap();
    let (status, body) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Warfarin 5mg daily");
    assert_eq!(body["patient_age"], 70);
    assert_eq!(body["dosage"][0]["dosage_status"], "Monitor closely for elderly patients.");
}

#[tokio::test]
async fn test_analyze_prescription_requires_file() {
    let boundary = "b";
    let multipart = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"patient_age\"\r\n\r\n30\r\n--{b}--\r\n",
        b = boundary
    );
    let req = Request::builder()
        .method("POST")
        .uri("/analyze-prescription")
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(multipart))
        .unwrap();
    let (status, _) = send(app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["interaction_records"], 1);
    assert_eq!(body["models_used"]["ocr"], "placeholder-ocr");
    assert_eq!(body["models_used"]["resolver"], "mock");
}
