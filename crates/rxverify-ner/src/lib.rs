//! Drug-name extraction from prescription text.
//!
//! Three extractors share the [`DrugExtractor`] contract:
//! - [`HuggingFaceNer`]: remote token-classification model (MEDICINE entities)
//! - [`DictionaryNer`]: local Aho-Corasick match against an embedded drug list
//! - [`FixedExtractor`]: returns a configured list, for demos and tests

mod entity_types;
mod dictionary;
mod huggingface;
mod fixed;

pub use entity_types::{EntityType, normalize_entity_label};
pub use dictionary::{DictionaryNer, DictionaryStats};
pub use huggingface::{HuggingFaceNer, parse_entities};
pub use fixed::FixedExtractor;

use async_trait::async_trait;
use rxverify_common::{dedup_mentions, DrugMention, RxVerifyError};

pub type Result<T> = std::result::Result<T, NerServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum NerServiceError {
    #[error("NER service request failed: {0}")]
    Request(String),

    #[error("NER service returned an error: {0}")]
    Service(String),

    #[error("Unexpected NER response: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for NerServiceError {
    fn from(e: reqwest::Error) -> Self {
        NerServiceError::Request(e.to_string())
    }
}

impl From<RxVerifyError> for NerServiceError {
    fn from(e: RxVerifyError) -> Self {
        NerServiceError::Request(e.to_string())
    }
}

impl From<NerServiceError> for RxVerifyError {
    fn from(e: NerServiceError) -> Self {
        RxVerifyError::Extraction(e.to_string())
    }
}

/// Finds drug-name mentions in free text.
///
/// Implementations may return duplicates or mixed casing; callers go through
/// [`extract_drugs`] to get the de-duplicated list.
#[async_trait]
pub trait DrugExtractor: Send + Sync {
    async fn find_drug_mentions(&self, text: &str) -> Result<Vec<DrugMention>>;

    /// Short identifier reported in `models_used`.
    fn name(&self) -> &str;
}

/// Runs an extractor and de-duplicates the result case-insensitively,
/// preserving first-appearance order. Blank text yields no mentions.
pub async fn extract_drugs(
    extractor: &dyn DrugExtractor,
    text: &str,
) -> std::result::Result<Vec<DrugMention>, RxVerifyError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mentions = extractor.find_drug_mentions(text).await?;
    let mentions = dedup_mentions(mentions);
    tracing::debug!(extractor = extractor.name(), count = mentions.len(), "extracted drug mentions");
    Ok(mentions)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    #[async_trait]
    impl DrugExtractor for Failing {
        async fn find_drug_mentions(&self, _text: &str) -> Result<Vec<DrugMention>> {
            Err(NerServiceError::Request("connection refused".into()))
        }
        fn name(&self) -> &str { "failing" }
    }

    #[tokio::test]
    async fn test_extract_drugs_dedups() {
        let ner = FixedExtractor::new(["Warfarin", "aspirin", "warfarin"]);
        let out = extract_drugs(&ner, "anything").await.unwrap();
        let names: Vec<_> = out.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Warfarin", "aspirin"]);
    }

    #[tokio::test]
    async fn test_blank_text_skips_extractor() {
        let out = extract_drugs(&Failing, "   \n").await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_extraction_error() {
        let err = extract_drugs(&Failing, "Warfarin 5mg").await.unwrap_err();
        assert!(matches!(err, RxVerifyError::Extraction(_)));
    }
}
