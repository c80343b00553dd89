use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RxVerifyError {
    /// OCR or NER transport failure. Fatal to the request.
    #[error("Could not process the prescription: {0}")]
    Extraction(String),

    #[error("No drugs found in the prescription.")]
    NoDrugsFound,

    #[error("Interaction dataset unavailable: {0}")]
    DatasetUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network capabilities capped: {0}")]
    Security(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RxVerifyError>;

impl RxVerifyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RxVerifyError::Extraction(_)         => StatusCode::BAD_GATEWAY,
            RxVerifyError::NoDrugsFound          => StatusCode::NOT_FOUND,
            RxVerifyError::InvalidInput(_)       => StatusCode::BAD_REQUEST,
            RxVerifyError::DatasetUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _                                    => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error returned from HTTP handlers. Renders as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self { status, detail: detail.into() }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }
}

impl From<RxVerifyError> for ApiError {
    fn from(err: RxVerifyError) -> Self {
        let status = err.status_code();
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}
