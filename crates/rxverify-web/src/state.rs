//! Shared application state for the web server.

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use rxverify_common::{HttpPolicy, SandboxClient};
use rxverify_config::{Config, NerBackend, OcrBackend, SummarizerBackend};
use rxverify_engine::{
    AgeKeywordPolicy, DosageEngine, IdentifierResolver, InteractionEngine, PrescriptionPipeline,
};
use rxverify_ingestion::{
    HttpOcrService, InteractionDataset, OcrService, PlaceholderOcr, RxNormClient, TextNormalizer,
};
use rxverify_llm::{
    KeywordRiskSummarizer, LlmRiskSummarizer, OllamaBackend, OpenAiCompatibleBackend, RiskSummarizer,
};
use rxverify_ner::{DictionaryNer, DrugExtractor, FixedExtractor, HuggingFaceNer};
use tracing::info;

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub pipeline: PrescriptionPipeline,
    pub started_at: DateTime<Utc>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(pipeline: PrescriptionPipeline) -> Self {
        Self { pipeline, started_at: Utc::now() }
    }

    /// Wire every collaborator from configuration. The interaction dataset
    /// is optional: a missing file leaves the engine with no records.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let policy = HttpPolicy {
            timeout: std::time::Duration::from_secs(config.http.timeout_secs),
            retry_once: config.http.retry_once,
        };
        let mut client = SandboxClient::with_policy(policy)?;
        client.allow_url(&config.rxnorm.base_url)?;
        if let Some(url) = &config.ner.url {
            client.allow_url(url)?;
        }
        if let Some(url) = &config.ocr.url {
            client.allow_url(url)?;
        }
        if config.summarizer.backend != SummarizerBackend::Keyword {
            client.allow_url(&config.summarizer.base_url)?;
        }

        let ocr: Arc<dyn OcrService> = match config.ocr.backend {
            OcrBackend::Placeholder => Arc::new(PlaceholderOcr),
            OcrBackend::Http => {
                let url = config.ocr.url.as_deref().context("[ocr] backend = \"http\" requires url")?;
                Arc::new(HttpOcrService::new(client.clone(), url))
            }
        };

        let extractor: Arc<dyn DrugExtractor> = match config.ner.backend {
            NerBackend::Dictionary => Arc::new(DictionaryNer::with_embedded_list()?),
            NerBackend::Fixed => Arc::new(FixedExtractor::demo()),
            NerBackend::HuggingFace => {
                let url = config.ner.url.as_deref().context("[ner] backend = \"huggingface\" requires url")?;
                Arc::new(
                    HuggingFaceNer::new(client.clone(), url, config.ner.api_key())
                        .with_entity_group(&config.ner.entity_group),
                )
            }
        };

        let summarizer: Arc<dyn RiskSummarizer> = match config.summarizer.backend {
            SummarizerBackend::Keyword => Arc::new(KeywordRiskSummarizer),
            SummarizerBackend::Ollama => Arc::new(LlmRiskSummarizer::new(Arc::new(OllamaBackend::new(
                client.clone(),
                &config.summarizer.base_url,
                &config.summarizer.model,
            )))),
            SummarizerBackend::OpenaiCompatible => {
                Arc::new(LlmRiskSummarizer::new(Arc::new(OpenAiCompatibleBackend::new(
                    client.clone(),
                    &config.summarizer.base_url,
                    &config.summarizer.model,
                    config.summarizer.api_key(),
                ))))
            }
        };

        let rxnorm = Arc::new(RxNormClient::with_base_url(client, &config.rxnorm.base_url));
        let dataset = Arc::new(InteractionDataset::load_or_empty(&config.dataset.path));

        let pipeline = PrescriptionPipeline::new(
            TextNormalizer::new(ocr),
            extractor,
            IdentifierResolver::new(rxnorm.clone(), config.rxnorm.cache_capacity),
            InteractionEngine::new(dataset, summarizer),
            DosageEngine::new(rxnorm, Arc::new(AgeKeywordPolicy::from_config(&config.dosage))),
        );

        let models = pipeline.models_used();
        info!(
            ocr = %models.ocr,
            ner = %models.ner,
            summarizer = %models.summarizer,
            interactions = pipeline.dataset_len(),
            "pipeline ready"
        );

        Ok(Self::new(pipeline))
    }
}
