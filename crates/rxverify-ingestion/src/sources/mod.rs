//! Drug reference data sources.

pub mod rxnorm;
pub mod mock;

pub use rxnorm::RxNormClient;
pub use mock::MockDrugSource;

use async_trait::async_trait;
use rxverify_common::Result;

/// Maps a free-text drug name to a canonical identifier (RxCUI).
#[async_trait]
pub trait IdentifierLookup: Send + Sync {
    /// `Ok(None)` means the service answered but knows no such drug.
    async fn lookup_identifier(&self, name: &str) -> Result<Option<String>>;

    fn name(&self) -> &str;
}

/// Dosage-form and product lookups keyed by canonical identifier.
#[async_trait]
pub trait DrugInfoService: Send + Sync {
    /// Clinical drug names (strength + form) for an identifier.
    async fn lookup_dosage_forms(&self, rxcui: &str) -> Result<Vec<String>>;

    /// The active-ingredient identifier, if the service knows one.
    async fn lookup_ingredient(&self, rxcui: &str) -> Result<Option<String>>;

    /// Branded products containing an ingredient.
    async fn lookup_branded_products(&self, ingredient_rxcui: &str) -> Result<Vec<String>>;
}
