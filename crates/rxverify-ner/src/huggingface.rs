//! Hugging Face token-classification client.
//!
//! Posts `{"inputs": text}` to an inference endpoint running a clinical NER
//! model with `aggregation_strategy=simple` and keeps entities whose group
//! normalizes to the configured one (MEDICINE by default).
//!
//! Response shape:
//! `[{"entity_group": "MEDICINE", "score": 0.99, "word": "war farin", "start": 0, "end": 8}]`

use async_trait::async_trait;
use rxverify_common::{DrugMention, SandboxClient};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::entity_types::{normalize_entity_label, strip_bio_prefix, EntityType};
use crate::{DrugExtractor, NerServiceError, Result};

pub struct HuggingFaceNer {
    client: SandboxClient,
    url: String,
    api_key: Option<SecretString>,
    entity_group: EntityType,
    /// Configured label, matched literally when it has no known group.
    raw_group: String,
}

impl HuggingFaceNer {
    pub fn new(client: SandboxClient, url: impl Into<String>, api_key: Option<SecretString>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
            entity_group: EntityType::Medicine,
            raw_group: EntityType::Medicine.as_str().to_string(),
        }
    }

    /// Keep entities of this group instead of MEDICINE.
    pub fn with_entity_group(mut self, label: &str) -> Self {
        self.entity_group = normalize_entity_label(label);
        self.raw_group = strip_bio_prefix(label).to_string();
        self
    }

    /// Whether an entity with this raw label belongs to the configured group.
    /// Unknown configured labels compare case-insensitively against the raw
    /// label, so they never match every unmapped entity.
    pub fn keeps_group(&self, label: Option<&str>) -> bool {
        let Some(label) = label else { return false };
        match self.entity_group {
            EntityType::Other => strip_bio_prefix(label).eq_ignore_ascii_case(&self.raw_group),
            group => normalize_entity_label(label) == group,
        }
    }

    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn infer(&self, text: &str) -> Result<Value> {
        let mut request = self.client
            .post(&self.url)?
            .json(&serde_json::json!({ "inputs": text }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = self.client.send(request).await?;
        let status = response.status();
        let body: Value = response.json().await?;

        if let Some(err) = body.get("error").and_then(|e| e.as_str()) {
            return Err(NerServiceError::Service(format!("HTTP {}: {}", status, err)));
        }
        if !status.is_success() {
            return Err(NerServiceError::Service(format!("HTTP {}", status)));
        }
        Ok(body)
    }
}

#[async_trait]
impl DrugExtractor for HuggingFaceNer {
    async fn find_drug_mentions(&self, text: &str) -> Result<Vec<DrugMention>> {
        let body = self.infer(text).await?;
        let mentions: Vec<DrugMention> = parse_entities(&body)?
            .into_iter()
            .filter(|m| self.keeps_group(m.entity_group.as_deref()))
            .collect();
        debug!(count = mentions.len(), "Hugging Face NER mentions");
        Ok(mentions)
    }

    fn name(&self) -> &str {
        "huggingface-ner"
    }
}

/// Parse a token-classification response into mentions of every group.
///
/// Sub-word tokens come back separated by spaces, so spaces are stripped
/// from `word`. Repeated names keep the highest score. A batched response
/// (array of arrays) is flattened.
pub fn parse_entities(body: &Value) -> Result<Vec<DrugMention>> {
    let items = body
        .as_array()
        .ok_or_else(|| NerServiceError::Parse("expected a JSON array".to_string()))?;

    let flat: Vec<&Value> = items
        .iter()
        .flat_map(|item| match item.as_array() {
            Some(inner) => inner.iter().collect::<Vec<_>>(),
            None => vec![item],
        })
        .collect();

    let mut out: Vec<DrugMention> = Vec::new();
    for entity in flat {
        let word = entity["word"].as_str().unwrap_or_default().replace(' ', "");
        if word.is_empty() {
            continue;
        }
        let group = entity["entity_group"]
            .as_str()
            .or_else(|| entity["entity"].as_str())
            .unwrap_or("OTHER");
        let score = entity["score"].as_f64().map(|s| s as f32);

        match out.iter_mut().find(|m| m.name == word) {
            Some(existing) => {
                if score > existing.score {
                    existing.score = score;
                }
            }
            None => {
                let mut mention = DrugMention::new(word).with_group(group);
                mention.score = score;
                out.push(mention);
            }
        }
    }
    Ok(out)
}
