use reqwest::{Client, ClientBuilder, StatusCode};
use std::collections::HashSet;
use std::time::Duration;
use tracing::warn;
use url::Url;
use crate::error::RxVerifyError;

/// Timeout and retry policy applied to every outbound collaborator call.
#[derive(Debug, Clone, Copy)]
pub struct HttpPolicy {
    pub timeout: Duration,
    /// Retry once on connect/timeout errors and 429/5xx responses.
    pub retry_once: bool,
}

impl Default for HttpPolicy {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(10), retry_once: true }
    }
}

/// An HTTP client that only talks to approved domains, with a bounded
/// timeout and a single retry on transient failure.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
    policy: HttpPolicy,
}

impl SandboxClient {
    /// Creates a client with the default allowlist of drug-data and model domains.
    pub fn new() -> Result<Self, RxVerifyError> {
        Self::with_policy(HttpPolicy::default())
    }

    pub fn with_policy(policy: HttpPolicy) -> Result<Self, RxVerifyError> {
        let mut allowlist = HashSet::new();
        let domains = vec![
            "rxnav.nlm.nih.gov",          // RxNorm / RxNav
            "api-inference.huggingface.co", // Hugging Face inference
            "router.huggingface.co",      // Hugging Face inference router
            "api.openai.com",             // OpenAI-compatible summarizer
            "localhost",                  // Ollama / local OCR
            "127.0.0.1",
        ];

        for d in domains {
            allowlist.insert(d.to_string());
        }

        let client = ClientBuilder::new()
            .timeout(policy.timeout)
            .build()
            .map_err(|e| RxVerifyError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist, policy })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Allows the host of a configured endpoint URL.
    pub fn allow_url(&mut self, url: &str) -> Result<(), RxVerifyError> {
        let parsed = Url::parse(url)
            .map_err(|e| RxVerifyError::Config(format!("Invalid endpoint URL {}: {}", url, e)))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| RxVerifyError::Config(format!("Endpoint URL has no host: {}", url)))?;
        self.allow_domain(host);
        Ok(())
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, RxVerifyError> {
        self.check(url)?;
        Ok(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, RxVerifyError> {
        self.check(url)?;
        Ok(self.client.post(url))
    }

    /// Sends a request, retrying once when the first attempt fails transiently.
    pub async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, RxVerifyError> {
        let retry = if self.policy.retry_once { request.try_clone() } else { None };
        let first = request.send().await;

        let transient = match &first {
            Ok(resp) => is_transient_status(resp.status()),
            Err(e) => e.is_timeout() || e.is_connect(),
        };

        match retry {
            Some(again) if transient => {
                match &first {
                    Ok(resp) => warn!(status = %resp.status(), "transient HTTP status, retrying once"),
                    Err(e) => warn!(error = %e, "transient HTTP failure, retrying once"),
                }
                Ok(again.send().await?)
            }
            _ => Ok(first?),
        }
    }

    fn check(&self, url: &str) -> Result<(), RxVerifyError> {
        if !self.is_allowed(url) {
            return Err(RxVerifyError::Security(format!(
                "domain not in allowlist for URL {}",
                url
            )));
        }
        Ok(())
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}
