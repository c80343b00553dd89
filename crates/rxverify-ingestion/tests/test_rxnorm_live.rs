//! Live RxNav lookups.
//!
//! Hits the public NLM API. Run with:
//! ```bash
//! cargo test --package rxverify-ingestion --test test_rxnorm_live -- --ignored --nocapture
//! ```

use rxverify_common::SandboxClient;
use rxverify_ingestion::{DrugInfoService, IdentifierLookup, RxNormClient};

#[tokio::test]
#[ignore] // Requires network access
async fn test_resolve_warfarin() {
    let client = RxNormClient::new(SandboxClient::new().unwrap());

    let rxcui = client.lookup_identifier("warfarin").await.unwrap();
    println!("warfarin -> {:?}", rxcui);
    assert_eq!(rxcui.as_deref(), Some("11289"));
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_dosage_forms_and_alternatives() {
    let client = RxNormClient::new(SandboxClient::new().unwrap());

    let forms = client.lookup_dosage_forms("11289").await.unwrap();
    println!("{} clinical drugs, e.g. {:?}", forms.len(), forms.first());
    assert!(!forms.is_empty());

    let ingredient = client.lookup_ingredient("11289").await.unwrap();
    println!("ingredient: {:?}", ingredient);
    if let Some(ing) = ingredient {
        let brands = client.lookup_branded_products(&ing).await.unwrap();
        println!("{} branded products", brands.len());
    }
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_unknown_name_is_none() {
    let client = RxNormClient::new(SandboxClient::new().unwrap());
    let rxcui = client.lookup_identifier("definitelynotadrugname").await.unwrap();
    assert!(rxcui.is_none());
}
