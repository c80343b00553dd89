//! rxverify-llm — interaction risk summarization.
//! Keyword classification plus optional LLM-backed summarizers that fall
//! back to keywords whenever the model is unavailable or unclear.

pub mod backend;
pub mod summarizer;

pub use backend::{LlmBackend, LlmError, LlmRequest, LlmResponse, Message, OllamaBackend, OpenAiCompatibleBackend};
pub use summarizer::{classify_keywords, KeywordRiskSummarizer, LlmRiskSummarizer, RiskSummarizer};
