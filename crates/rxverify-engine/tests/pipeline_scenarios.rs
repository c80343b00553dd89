//! End-to-end pipeline scenarios with in-memory collaborators.
//!
//! Run with: cargo test --package rxverify-engine --test pipeline_scenarios

use std::sync::Arc;

use rxverify_common::{AlertLevel, InteractionRecord, InteractionStatus, RxVerifyError};
use rxverify_engine::{
    AgeKeywordPolicy, DosageEngine, IdentifierResolver, InteractionEngine, PrescriptionPipeline,
};
use rxverify_ingestion::{InteractionDataset, MockDrugSource, PlaceholderOcr, PrescriptionInput, TextNormalizer};
use rxverify_llm::KeywordRiskSummarizer;
use rxverify_ner::{DrugExtractor, FixedExtractor};

const TEXT: &str = "Take Paracetamol 500mg and Warfarin 10mg daily.";

fn source() -> Arc<MockDrugSource> {
    Arc::new(
        MockDrugSource::new()
            .with("Paracetamol", "161")
            .with("Warfarin", "11289")
            .with_dosage_forms("161", &["acetaminophen 500 MG Oral Tablet"])
            .with_ingredient("11289", "11289")
            .with_branded("11289", &["Coumadin 5 MG Oral Tablet"]),
    )
}

fn dataset() -> InteractionDataset {
    InteractionDataset::from_records(vec![InteractionRecord {
        rxcui_a: "161".into(),
        rxcui_b: "11289".into(),
        drug_a: "Acetaminophen".into(),
        drug_b: "Warfarin".into(),
        description: "Acetaminophen may increase risk of bleeding with Warfarin".into(),
    }])
}

fn pipeline_with(extractor: Arc<dyn DrugExtractor>, source: Arc<MockDrugSource>) -> PrescriptionPipeline {
    PrescriptionPipeline::new(
        TextNormalizer::new(Arc::new(PlaceholderOcr)),
        extractor,
        IdentifierResolver::new(source.clone(), 64),
        InteractionEngine::new(Arc::new(dataset()), Arc::new(KeywordRiskSummarizer)),
        DosageEngine::new(source, Arc::new(AgeKeywordPolicy::default())),
    )
}

fn pipeline() -> PrescriptionPipeline {
    pipeline_with(Arc::new(FixedExtractor::demo()), source())
}

fn text(s: &str) -> PrescriptionInput {
    PrescriptionInput::Text(s.to_string())
}

#[tokio::test]
async fn test_paracetamol_warfarin_is_severe() {
    let report = pipeline().check_interactions(&text(TEXT)).await.unwrap();
    assert_eq!(report.status, InteractionStatus::Checked);
    assert_eq!(report.interactions.len(), 1);
    let hit = &report.interactions[0];
    assert_eq!(hit.alert_level, AlertLevel::Severe);
    assert_eq!(hit.alert, AlertLevel::Severe.message());
    assert_eq!((hit.rxcui1.as_str(), hit.rxcui2.as_str()), ("161", "11289"));
}

#[tokio::test]
async fn test_elderly_patient_status() {
    let profiles = pipeline().analyze_dosage(&text(TEXT), 70).await.unwrap();
    let paracetamol = profiles.iter().find(|p| p.drug == "Paracetamol").unwrap();
    assert_eq!(paracetamol.rxcui, "161");
    assert_eq!(paracetamol.dosage_status, "Monitor closely for elderly patients.");
    assert_eq!(paracetamol.dosage_forms, vec!["acetaminophen 500 MG Oral Tablet"]);
}

#[tokio::test]
async fn test_child_with_tablet_status() {
    let profiles = pipeline()
        .analyze_dosage(&text("Paracetamol 250mg tablet twice daily"), 10)
        .await
        .unwrap();
    assert!(!profiles.is_empty());
    assert!(profiles.iter().all(|p| p.dosage_status == "May need dosage adjustment for children."));
}

#[tokio::test]
async fn test_no_drugs_found_for_both_operations() {
    let p = pipeline_with(Arc::new(FixedExtractor::new(Vec::<String>::new())), source());
    let err = p.check_interactions(&text(TEXT)).await.unwrap_err();
    assert!(matches!(err, RxVerifyError::NoDrugsFound));
    let err = p.analyze_dosage(&text(TEXT), 40).await.unwrap_err();
    assert!(matches!(err, RxVerifyError::NoDrugsFound));
}

#[tokio::test]
async fn test_single_resolved_drug_is_insufficient() {
    let p = pipeline_with(Arc::new(FixedExtractor::new(["Warfarin", "Unknownium"])), source());
    let report = p.check_interactions(&text("Warfarin and Unknownium")).await.unwrap();
    assert_eq!(report.status, InteractionStatus::InsufficientDrugs);
    assert!(report.interactions.is_empty());
    assert!(report.message().starts_with("Not enough drugs"));
}

#[tokio::test]
async fn test_resolution_outage_degrades_gracefully() {
    let p = pipeline_with(Arc::new(FixedExtractor::demo()), Arc::new(MockDrugSource::new().failing()));
    let report = p.check_interactions(&text(TEXT)).await.unwrap();
    assert_eq!(report.status, InteractionStatus::InsufficientDrugs);
    let profiles = p.analyze_dosage(&text(TEXT), 40).await.unwrap();
    assert!(profiles.is_empty());
}

#[tokio::test]
async fn test_image_input_uses_ocr_text() {
    let p = pipeline();
    let analysis = p.analyze(&PrescriptionInput::Image(vec![0xFF, 0xD8]), 70).await.unwrap();
    assert!(analysis.text.contains("patient over 60"));
    assert_eq!(analysis.verification_status, "processed");
    assert_eq!(analysis.interactions.interactions.len(), 1);
    assert_eq!(analysis.dosage.len(), 2);
    assert_eq!(analysis.models_used.ocr, "placeholder-ocr");
    assert_eq!(analysis.models_used.ner, "fixed");
}

#[tokio::test]
async fn test_analyze_without_drugs_is_not_an_error() {
    let p = pipeline_with(Arc::new(FixedExtractor::new(Vec::<String>::new())), source());
    let analysis = p.analyze(&text("rest and fluids"), 30).await.unwrap();
    assert_eq!(analysis.verification_status, "no_drugs_found");
    assert!(analysis.medical_entities.is_empty());
    assert_eq!(analysis.interactions.status, InteractionStatus::InsufficientDrugs);
    assert!(analysis.dosage.is_empty());
}

#[tokio::test]
async fn test_synonyms_collapse_to_one_profile() {
    let src = Arc::new(
        MockDrugSource::new()
            .with("Warfarin", "11289")
            .with("Coumadin", "11289"),
    );
    let p = pipeline_with(Arc::new(FixedExtractor::new(["Warfarin", "Coumadin"])), src);
    let profiles = p.analyze_dosage(&text("Warfarin (Coumadin) 5mg"), 40).await.unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].drug, "Warfarin");
}
