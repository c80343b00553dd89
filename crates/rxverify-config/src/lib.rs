//! Configuration loading for RxVerify.
//! Reads rxverify.toml from the current directory or path in RXVERIFY_CONFIG env var.
//! Every section has defaults, so a missing file yields a runnable demo setup.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub rxnorm: RxNormConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub ner: NerConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub dosage: DosageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16    { 8000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "bool_true")]
    pub retry_once: bool,
}

fn default_timeout_secs() -> u64 { 10 }
fn bool_true()            -> bool { true }

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: default_timeout_secs(), retry_once: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RxNormConfig {
    #[serde(default = "default_rxnorm_url")]
    pub base_url: String,
    /// Resolution cache entries; 0 disables caching.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_rxnorm_url()     -> String { "https://rxnav.nlm.nih.gov/REST".to_string() }
fn default_cache_capacity() -> usize  { 1024 }

impl Default for RxNormConfig {
    fn default() -> Self {
        Self { base_url: default_rxnorm_url(), cache_capacity: default_cache_capacity() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_path")]
    pub path: String,
}

fn default_dataset_path() -> String { "data/ddi_mapped_with_rxcui.csv".to_string() }

impl Default for DatasetConfig {
    fn default() -> Self {
        Self { path: default_dataset_path() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NerBackend {
    Dictionary,
    #[serde(rename = "huggingface")]
    HuggingFace,
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerConfig {
    #[serde(default = "default_ner_backend")]
    pub backend: NerBackend,
    /// Token-classification inference endpoint (huggingface backend only).
    #[serde(default)]
    pub url: Option<String>,
    /// Name of the env var holding the inference API key.
    #[serde(default = "default_ner_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_entity_group")]
    pub entity_group: String,
}

fn default_ner_backend()  -> NerBackend { NerBackend::Dictionary }
fn default_ner_key_env()  -> String { "HUGGING_FACE_API_KEY".to_string() }
fn default_entity_group() -> String { "MEDICINE".to_string() }

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            backend: default_ner_backend(),
            url: None,
            api_key_env: default_ner_key_env(),
            entity_group: default_entity_group(),
        }
    }
}

impl NerConfig {
    pub fn api_key(&self) -> Option<SecretString> {
        secret_from_env(&self.api_key_env)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackend {
    Placeholder,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_ocr_backend")]
    pub backend: OcrBackend,
    #[serde(default)]
    pub url: Option<String>,
}

fn default_ocr_backend() -> OcrBackend { OcrBackend::Placeholder }

impl Default for OcrConfig {
    fn default() -> Self {
        Self { backend: default_ocr_backend(), url: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarizerBackend {
    Keyword,
    Ollama,
    OpenaiCompatible,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default = "default_summarizer_backend")]
    pub backend: SummarizerBackend,
    #[serde(default = "default_llm_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_key_env")]
    pub api_key_env: String,
}

fn default_summarizer_backend() -> SummarizerBackend { SummarizerBackend::Keyword }
fn default_llm_url()     -> String { "http://localhost:11434".to_string() }
fn default_llm_model()   -> String { "granite3.3:8b".to_string() }
fn default_llm_key_env() -> String { "SUMMARIZER_API_KEY".to_string() }

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            backend: default_summarizer_backend(),
            base_url: default_llm_url(),
            model: default_llm_model(),
            api_key_env: default_llm_key_env(),
        }
    }
}

impl SummarizerConfig {
    pub fn api_key(&self) -> Option<SecretString> {
        secret_from_env(&self.api_key_env)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DosageConfig {
    /// Patients strictly younger than this are treated as children.
    #[serde(default = "default_pediatric_age")]
    pub pediatric_age: u32,
    /// Patients strictly older than this are treated as elderly.
    #[serde(default = "default_elderly_age")]
    pub elderly_age: u32,
    #[serde(default = "default_solid_oral_keywords")]
    pub solid_oral_keywords: Vec<String>,
}

fn default_pediatric_age() -> u32 { 18 }
fn default_elderly_age()   -> u32 { 65 }
fn default_solid_oral_keywords() -> Vec<String> {
    vec!["tablet".to_string(), "capsule".to_string()]
}

impl Default for DosageConfig {
    fn default() -> Self {
        Self {
            pediatric_age: default_pediatric_age(),
            elderly_age: default_elderly_age(),
            solid_oral_keywords: default_solid_oral_keywords(),
        }
    }
}

fn secret_from_env(var: &str) -> Option<SecretString> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}


impl Config {
    /// Load configuration from rxverify.toml.
    /// Checks RXVERIFY_CONFIG env var first, then current directory.
    /// A missing file falls back to defaults; a malformed one is an error.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var("RXVERIFY_CONFIG")
            .unwrap_or_else(|_| "rxverify.toml".to_string());

        if !Path::new(&path).exists() {
            tracing::warn!("Config file not found: {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path, e))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
