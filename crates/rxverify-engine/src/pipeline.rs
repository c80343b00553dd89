//! Request pipeline: normalize → extract → resolve → analyze.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rxverify_common::{
    DosageProfile, DrugMention, InteractionReport, ResolvedDrug, Result, RxVerifyError,
};
use rxverify_ingestion::{PrescriptionInput, TextNormalizer};
use rxverify_ner::{extract_drugs, DrugExtractor};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dosage::DosageEngine;
use crate::interactions::InteractionEngine;
use crate::resolver::{distinct_identifiers, IdentifierResolver};

pub const STATUS_PROCESSED: &str = "processed";
pub const STATUS_NO_DRUGS: &str = "no_drugs_found";

/// Default group for mentions whose extractor reports none.
const DEFAULT_GROUP: &str = "MEDICINE";

/// Extracted mentions of one entity group, highest score first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityGroup {
    pub entity_group: String,
    pub entities: Vec<DrugMention>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsUsed {
    pub ocr: String,
    pub ner: String,
    pub resolver: String,
    pub summarizer: String,
}

/// Combined result of one `analyze` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionAnalysis {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub patient_age: u32,
    pub medical_entities: Vec<EntityGroup>,
    pub resolved_drugs: Vec<ResolvedDrug>,
    pub interactions: InteractionReport,
    pub dosage: Vec<DosageProfile>,
    pub verification_status: String,
    pub models_used: ModelsUsed,
}

pub struct PrescriptionPipeline {
    normalizer: TextNormalizer,
    extractor: Arc<dyn DrugExtractor>,
    resolver: IdentifierResolver,
    interactions: InteractionEngine,
    dosage: DosageEngine,
}

/// Normalized text plus everything extraction and resolution produced.
struct Prepared {
    text: String,
    mentions: Vec<DrugMention>,
    resolved: Vec<ResolvedDrug>,
}

impl PrescriptionPipeline {
    pub fn new(
        normalizer: TextNormalizer,
        extractor: Arc<dyn DrugExtractor>,
        resolver: IdentifierResolver,
        interactions: InteractionEngine,
        dosage: DosageEngine,
    ) -> Self {
        Self { normalizer, extractor, resolver, interactions, dosage }
    }

    pub fn models_used(&self) -> ModelsUsed {
        ModelsUsed {
            ocr: self.normalizer.ocr_name().to_string(),
            ner: self.extractor.name().to_string(),
            resolver: self.resolver.lookup_name().to_string(),
            summarizer: self.interactions.summarizer_name().to_string(),
        }
    }

    pub fn dataset_len(&self) -> usize {
        self.interactions.dataset().len()
    }

    /// OCR an image and return its trimmed text.
    #[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
    pub async fn extract_text(&self, image: Vec<u8>) -> Result<String> {
        self.normalizer.normalize(&PrescriptionInput::Image(image)).await
    }

    #[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
    pub async fn check_interactions(&self, input: &PrescriptionInput) -> Result<InteractionReport> {
        let prepared = self.prepare(input).await?;
        if prepared.mentions.is_empty() {
            return Err(RxVerifyError::NoDrugsFound);
        }
        let ids = identifiers(&distinct_identifiers(&prepared.resolved));
        Ok(self.interactions.find_interactions(&ids).await)
    }

    #[instrument(skip(self, input), fields(request_id = %Uuid::new_v4()))]
    pub async fn analyze_dosage(&self, input: &PrescriptionInput, age: u32) -> Result<Vec<DosageProfile>> {
        let prepared = self.prepare(input).await?;
        if prepared.mentions.is_empty() {
            return Err(RxVerifyError::NoDrugsFound);
        }
        let distinct = distinct_identifiers(&prepared.resolved);
        Ok(self.dosage.analyze(&distinct, age, &prepared.text).await)
    }

    /// Full analysis in one pass. Finding no drugs is reported through
    /// `verification_status`, not as an error.
    pub async fn analyze(&self, input: &PrescriptionInput, age: u32) -> Result<PrescriptionAnalysis> {
        self.analyze_request(Uuid::new_v4(), input, age).await
    }

    #[instrument(name = "analyze", skip(self, input))]
    async fn analyze_request(
        &self,
        request_id: Uuid,
        input: &PrescriptionInput,
        age: u32,
    ) -> Result<PrescriptionAnalysis> {
        let prepared = self.prepare(input).await?;
        let distinct = distinct_identifiers(&prepared.resolved);
        let ids = identifiers(&distinct);

        let (interactions, dosage) = tokio::join!(
            self.interactions.find_interactions(&ids),
            self.dosage.analyze(&distinct, age, &prepared.text),
        );

        let verification_status = if prepared.mentions.is_empty() {
            STATUS_NO_DRUGS
        } else {
            STATUS_PROCESSED
        };
        info!(
            drugs = prepared.mentions.len(),
            resolved = ids.len(),
            interactions = interactions.interactions.len(),
            status = verification_status,
            "prescription analyzed"
        );

        Ok(PrescriptionAnalysis {
            request_id,
            timestamp: Utc::now(),
            medical_entities: group_entities(&prepared.mentions),
            text: prepared.text,
            patient_age: age,
            resolved_drugs: prepared.resolved,
            interactions,
            dosage,
            verification_status: verification_status.to_string(),
            models_used: self.models_used(),
        })
    }

    async fn prepare(&self, input: &PrescriptionInput) -> Result<Prepared> {
        let text = self.normalizer.normalize(input).await?;
        let mentions = extract_drugs(self.extractor.as_ref(), &text).await?;
        let resolved = self.resolver.resolve_all(&mentions).await;
        Ok(Prepared { text, mentions, resolved })
    }
}

fn identifiers(drugs: &[ResolvedDrug]) -> Vec<String> {
    drugs.iter().filter_map(|d| d.rxcui.clone()).collect()
}

/// Group mentions by entity group (first-appearance order of groups) and
/// sort each group by descending score; unscored mentions sort last.
pub fn group_entities(mentions: &[DrugMention]) -> Vec<EntityGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<DrugMention>> = HashMap::new();
    for m in mentions {
        let group = m.entity_group.clone().unwrap_or_else(|| DEFAULT_GROUP.to_string());
        if !groups.contains_key(&group) {
            order.push(group.clone());
        }
        groups.entry(group).or_default().push(m.clone());
    }

    order
        .into_iter()
        .map(|group| {
            let mut entities = groups.remove(&group).unwrap_or_default();
            entities.sort_by(|a, b| {
                b.score
                    .unwrap_or(f32::MIN)
                    .total_cmp(&a.score.unwrap_or(f32::MIN))
            });
            EntityGroup { entity_group: group, entities }
        })
        .collect()
}
