//! OCR collaborators.
//!
//! `HttpOcrService` posts `{"image_data": <base64>}` to an OCR endpoint and
//! reads back `{"text": ...}`. `PlaceholderOcr` returns a fixed sample
//! prescription so the server runs without an OCR backend.

use async_trait::async_trait;
use base64::Engine;
use rxverify_common::{RxVerifyError, SandboxClient};
use serde::Deserialize;
use tracing::{debug, instrument};

pub const SAMPLE_PRESCRIPTION: &str =
    "Paracetamol 500mg daily. Warfarin 10mg. Prescription for a patient over 60.";

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR request failed: {0}")]
    Request(String),

    #[error("OCR service returned HTTP {0}")]
    Status(u16),

    #[error("OCR response malformed: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for OcrError {
    fn from(e: reqwest::Error) -> Self {
        OcrError::Request(e.to_string())
    }
}

impl From<RxVerifyError> for OcrError {
    fn from(e: RxVerifyError) -> Self {
        OcrError::Request(e.to_string())
    }
}

impl From<OcrError> for RxVerifyError {
    fn from(e: OcrError) -> Self {
        RxVerifyError::Extraction(e.to_string())
    }
}

/// Turns prescription image bytes into text.
#[async_trait]
pub trait OcrService: Send + Sync {
    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError>;

    fn name(&self) -> &str;
}

pub struct HttpOcrService {
    client: SandboxClient,
    url: String,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(default)]
    text: String,
}

impl HttpOcrService {
    pub fn new(client: SandboxClient, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

#[async_trait]
impl OcrService for HttpOcrService {
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let request = self.client
            .post(&self.url)?
            .json(&serde_json::json!({ "image_data": encoded }));

        let response = self.client.send(request).await?;
        if !response.status().is_success() {
            return Err(OcrError::Status(response.status().as_u16()));
        }

        let body: OcrResponse = response
            .json()
            .await
            .map_err(|e| OcrError::Parse(e.to_string()))?;
        debug!(chars = body.text.len(), "OCR text received");
        Ok(body.text)
    }

    fn name(&self) -> &str {
        "http-ocr"
    }
}

/// Simulated OCR: ignores the image and returns [`SAMPLE_PRESCRIPTION`].
#[derive(Debug, Clone, Default)]
pub struct PlaceholderOcr;

#[async_trait]
impl OcrService for PlaceholderOcr {
    async fn extract_text(&self, _image: &[u8]) -> Result<String, OcrError> {
        Ok(SAMPLE_PRESCRIPTION.to_string())
    }

    fn name(&self) -> &str {
        "placeholder-ocr"
    }
}
