//! Interaction risk summarization.
//!
//! Maps a free-text interaction description to one of three alert buckets.
//! The keyword classifier is total and deterministic; the LLM summarizer asks
//! a chat model for a one-word bucket and falls back to keywords when the
//! model errors or answers with something else.

use std::sync::Arc;

use async_trait::async_trait;
use rxverify_common::{Alert, AlertLevel};
use tracing::{debug, warn};

use crate::backend::{LlmBackend, LlmRequest, Message};

const SEVERE_KEYWORDS: &[&str] = &["increase", "risk", "harmful", "severe"];
const CAUTION_KEYWORDS: &[&str] = &["decrease", "monitor", "caution"];

/// Classifies an interaction description into an [`Alert`]. Never fails.
#[async_trait]
pub trait RiskSummarizer: Send + Sync {
    async fn summarize(&self, description: &str) -> Alert;

    fn name(&self) -> &str;
}

/// Substring match on the lower-cased description; severe keywords win.
pub fn classify_keywords(description: &str) -> AlertLevel {
    let text = description.to_lowercase();
    if SEVERE_KEYWORDS.iter().any(|k| text.contains(k)) {
        AlertLevel::Severe
    } else if CAUTION_KEYWORDS.iter().any(|k| text.contains(k)) {
        AlertLevel::HighRisk
    } else {
        AlertLevel::NoSevereRisk
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeywordRiskSummarizer;

#[async_trait]
impl RiskSummarizer for KeywordRiskSummarizer {
    async fn summarize(&self, description: &str) -> Alert {
        Alert::new(classify_keywords(description))
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

const SYSTEM_PROMPT: &str = "You are a clinical pharmacology assistant. \
Classify the severity of the drug-drug interaction described by the user. \
Answer with exactly one word: severe, caution, or none.";

pub struct LlmRiskSummarizer {
    backend: Arc<dyn LlmBackend>,
    name: String,
}

impl LlmRiskSummarizer {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        let name = format!("llm:{}", backend.model_id());
        Self { backend, name }
    }

    /// Map a model reply to a bucket. Only the first word counts.
    pub fn parse_bucket(reply: &str) -> Option<AlertLevel> {
        let word = reply
            .split_whitespace()
            .next()?
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        match word.as_str() {
            "severe" | "major" | "high" => Some(AlertLevel::Severe),
            "caution" | "moderate" | "monitor" => Some(AlertLevel::HighRisk),
            "none" | "minor" | "low" => Some(AlertLevel::NoSevereRisk),
            _ => None,
        }
    }
}

#[async_trait]
impl RiskSummarizer for LlmRiskSummarizer {
    async fn summarize(&self, description: &str) -> Alert {
        let req = LlmRequest {
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(description)],
            model: None,
            max_tokens: Some(4),
            temperature: Some(0.0),
        };

        let level = match self.backend.complete(req).await {
            Ok(resp) => match Self::parse_bucket(&resp.content) {
                Some(level) => {
                    debug!(
                        model = %resp.model,
                        prompt_tokens = resp.prompt_tokens,
                        completion_tokens = resp.completion_tokens,
                        level = level.as_str(),
                        "LLM risk bucket"
                    );
                    level
                }
                None => {
                    warn!(reply = %resp.content, "unrecognised LLM risk reply, using keywords");
                    classify_keywords(description)
                }
            },
            Err(e) => {
                warn!(error = %e, "LLM summarizer failed, using keywords");
                classify_keywords(description)
            }
        };
        Alert::new(level)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
