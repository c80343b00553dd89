use std::sync::Arc;

use base64::Engine;
use rxverify_common::{Result, RxVerifyError};
use tracing::debug;

use crate::ocr::OcrService;

/// A prescription as submitted: typed text or an image to be OCR'd.
#[derive(Debug, Clone, PartialEq)]
pub enum PrescriptionInput {
    Text(String),
    Image(Vec<u8>),
}

impl PrescriptionInput {
    /// Build from the optional request fields. Non-blank text wins when both
    /// are set; `image_data` must be base64 (a `data:` URL prefix is accepted).
    /// Blank text with no image is passed through and yields no drugs.
    pub fn from_fields(text: Option<String>, image_data: Option<String>) -> Result<Self> {
        match (text, image_data) {
            (Some(text), _) if !text.trim().is_empty() => Ok(Self::Text(text)),
            (_, Some(data)) if !data.trim().is_empty() => Ok(Self::Image(decode_image_data(&data)?)),
            (Some(text), _) => Ok(Self::Text(text)),
            (None, _) => Err(RxVerifyError::InvalidInput(
                "either `text` or `image_data` must be provided".to_string(),
            )),
        }
    }
}

/// Decode base64 image data, tolerating a `data:image/...;base64,` prefix
/// and embedded whitespace.
pub fn decode_image_data(data: &str) -> Result<Vec<u8>> {
    let payload = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(RxVerifyError::InvalidInput("image_data is empty".to_string()));
    }
    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| RxVerifyError::InvalidInput(format!("image_data is not valid base64: {}", e)))
}

pub struct TextNormalizer {
    ocr: Arc<dyn OcrService>,
}

impl TextNormalizer {
    pub fn new(ocr: Arc<dyn OcrService>) -> Self {
        Self { ocr }
    }

    pub fn ocr_name(&self) -> &str {
        self.ocr.name()
    }

    /// Text is returned trimmed. Images go through OCR; an OCR failure or an
    /// empty OCR result is an extraction error. Empty typed text is returned
    /// as-is for the caller to judge.
    pub async fn normalize(&self, input: &PrescriptionInput) -> Result<String> {
        match input {
            PrescriptionInput::Text(text) => Ok(text.trim().to_string()),
            PrescriptionInput::Image(bytes) => {
                let text = self.ocr.extract_text(bytes).await?;
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Err(RxVerifyError::Extraction("OCR returned no text".to_string()));
                }
                debug!(chars = text.len(), "normalized OCR text");
                Ok(text)
            }
        }
    }
}
