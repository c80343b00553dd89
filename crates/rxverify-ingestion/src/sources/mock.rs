//! In-memory drug source for tests and offline demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rxverify_common::{mention_key, Result, RxVerifyError};

use super::{DrugInfoService, IdentifierLookup};

/// Mock source with hardcoded RxNorm-shaped data.
#[derive(Debug, Default)]
pub struct MockDrugSource {
    identifiers: HashMap<String, String>,
    dosage_forms: HashMap<String, Vec<String>>,
    ingredients: HashMap<String, String>,
    branded: HashMap<String, Vec<String>>,
    failing: bool,
    lookups: AtomicUsize,
    queried: Mutex<Vec<String>>,
}

impl MockDrugSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a drug name (case-insensitive) to an RxCUI.
    pub fn with(mut self, name: &str, rxcui: &str) -> Self {
        self.identifiers.insert(mention_key(name), rxcui.to_string());
        self
    }

    pub fn with_dosage_forms(mut self, rxcui: &str, forms: &[&str]) -> Self {
        self.dosage_forms.insert(rxcui.to_string(), forms.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn with_ingredient(mut self, rxcui: &str, ingredient: &str) -> Self {
        self.ingredients.insert(rxcui.to_string(), ingredient.to_string());
        self
    }

    pub fn with_branded(mut self, ingredient: &str, products: &[&str]) -> Self {
        self.branded.insert(ingredient.to_string(), products.iter().map(|p| p.to_string()).collect());
        self
    }

    /// Every call fails, simulating an unreachable service.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Number of `lookup_identifier` calls made so far.
    pub fn lookup_calls(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Names passed to `lookup_identifier`, in call order.
    pub fn queried_names(&self) -> Vec<String> {
        self.queried.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            return Err(RxVerifyError::Other(anyhow::anyhow!("mock drug source unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentifierLookup for MockDrugSource {
    async fn lookup_identifier(&self, name: &str) -> Result<Option<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.queried
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(name.to_string());
        self.check()?;
        Ok(self.identifiers.get(&mention_key(name)).cloned())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[async_trait]
impl DrugInfoService for MockDrugSource {
    async fn lookup_dosage_forms(&self, rxcui: &str) -> Result<Vec<String>> {
        self.check()?;
        Ok(self.dosage_forms.get(rxcui).cloned().unwrap_or_default())
    }

    async fn lookup_ingredient(&self, rxcui: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.ingredients.get(rxcui).cloned())
    }

    async fn lookup_branded_products(&self, ingredient_rxcui: &str) -> Result<Vec<String>> {
        self.check()?;
        Ok(self.branded.get(ingredient_rxcui).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_lookup_case_insensitive_and_counted() {
        let source = MockDrugSource::new().with("Warfarin", "11289");
        assert_eq!(source.lookup_identifier(" WARFARIN ").await.unwrap(), Some("11289".into()));
        assert_eq!(source.lookup_identifier("unknown").await.unwrap(), None);
        assert_eq!(source.lookup_calls(), 2);
    }

    #[tokio::test]
    async fn test_failing_mock_errors() {
        let source = MockDrugSource::new().with("Warfarin", "11289").failing();
        assert!(source.lookup_identifier("Warfarin").await.is_err());
        assert!(source.lookup_dosage_forms("11289").await.is_err());
    }
}
