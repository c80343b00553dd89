//! RxNorm / RxNav REST client.
//!
//! RxNav is the NLM's public API over RxNorm, the US normalized naming system
//! for clinical drugs. Three calls are used:
//!   - `rxcui.json?name=`: name -> RxCUI (`idGroup.rxnormId[0]`)
//!   - `rxcui/{id}/related.json?tty=SCD|SBD|IN`: related concepts by term type
//!     (clinical drugs, branded drugs, ingredients)
//!
//! API docs: https://lhncbc.nlm.nih.gov/RxNav/APIs/RxNormAPIs.html

use async_trait::async_trait;
use rxverify_common::{Result, RxVerifyError, SandboxClient};
use serde_json::Value;
use tracing::{debug, instrument};

use super::{DrugInfoService, IdentifierLookup};

pub const RXNAV_API_URL: &str = "https://rxnav.nlm.nih.gov/REST";

/// RxNorm term types used by related-concept lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermType {
    /// Semantic Clinical Drug, e.g. "warfarin sodium 5 MG Oral Tablet"
    Scd,
    /// Semantic Branded Drug, e.g. "Coumadin 5 MG Oral Tablet"
    Sbd,
    /// Ingredient
    In,
}

impl TermType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermType::Scd => "SCD",
            TermType::Sbd => "SBD",
            TermType::In => "IN",
        }
    }
}

pub struct RxNormClient {
    client: SandboxClient,
    base_url: String,
}

impl RxNormClient {
    pub fn new(client: SandboxClient) -> Self {
        Self::with_base_url(client, RXNAV_API_URL)
    }

    pub fn with_base_url(client: SandboxClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self.client.send(self.client.get(url)?).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RxVerifyError::Other(anyhow::anyhow!("RxNav returned HTTP {} for {}", status, url)));
        }
        Ok(response.json().await?)
    }

    /// Fetch related concepts of one term type for an RxCUI.
    #[instrument(skip(self))]
    pub async fn fetch_related(&self, rxcui: &str, tty: TermType) -> Result<Value> {
        let url = format!("{}/rxcui/{}/related.json?tty={}", self.base_url, rxcui, tty.as_str());
        debug!(rxcui = rxcui, tty = tty.as_str(), "Fetching RxNav related concepts");
        self.get_json(&url).await
    }
}

#[async_trait]
impl IdentifierLookup for RxNormClient {
    #[instrument(skip(self))]
    async fn lookup_identifier(&self, name: &str) -> Result<Option<String>> {
        let query = name.trim();
        if query.is_empty() {
            return Ok(None);
        }
        let url = reqwest::Url::parse_with_params(
            &format!("{}/rxcui.json", self.base_url),
            &[("name", query)],
        )
        .map_err(|e| RxVerifyError::Config(format!("Invalid RxNav base URL: {}", e)))?;

        debug!(name = query, "Resolving RxCUI");
        let body = self.get_json(url.as_str()).await?;
        Ok(parse_rxcui(&body))
    }

    fn name(&self) -> &str {
        "rxnav"
    }
}

#[async_trait]
impl DrugInfoService for RxNormClient {
    async fn lookup_dosage_forms(&self, rxcui: &str) -> Result<Vec<String>> {
        let body = self.fetch_related(rxcui, TermType::Scd).await?;
        Ok(parse_concept_names(&body))
    }

    async fn lookup_ingredient(&self, rxcui: &str) -> Result<Option<String>> {
        let body = self.fetch_related(rxcui, TermType::In).await?;
        Ok(parse_first_concept_rxcui(&body))
    }

    async fn lookup_branded_products(&self, ingredient_rxcui: &str) -> Result<Vec<String>> {
        let body = self.fetch_related(ingredient_rxcui, TermType::Sbd).await?;
        Ok(parse_concept_names(&body))
    }
}

/// `{"idGroup": {"rxnormId": ["11289"]}}` -> `Some("11289")`
pub fn parse_rxcui(body: &Value) -> Option<String> {
    body["idGroup"]["rxnormId"]
        .as_array()
        .and_then(|ids| ids.first())
        .and_then(|id| id.as_str())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn concepts(body: &Value) -> impl Iterator<Item = &Value> {
    body["relatedGroup"]["conceptGroup"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|group| group["conceptProperties"].as_array())
        .flatten()
}

/// Names from every concept group's `conceptProperties`, in response order.
pub fn parse_concept_names(body: &Value) -> Vec<String> {
    concepts(body)
        .filter_map(|c| c["name"].as_str())
        .map(str::to_string)
        .collect()
}

pub fn parse_first_concept_rxcui(body: &Value) -> Option<String> {
    concepts(body)
        .filter_map(|c| c["rxcui"].as_str())
        .next()
        .map(str::to_string)
}
