//! Dosage forms, branded alternatives and dosage status per resolved drug.

use std::sync::Arc;

use futures::future::join_all;
use rxverify_common::{DosageProfile, ResolvedDrug};
use rxverify_config::DosageConfig;
use rxverify_ingestion::DrugInfoService;
use tracing::{debug, warn};

pub const STATUS_APPROPRIATE: &str = "Appropriate";
pub const STATUS_CHILDREN: &str = "May need dosage adjustment for children.";
pub const STATUS_ELDERLY: &str = "Monitor closely for elderly patients.";

/// Decides a dosage status from patient age and the prescription text.
pub trait DosagePolicy: Send + Sync {
    fn status(&self, age: u32, text: &str) -> String;
}

/// Placeholder age heuristic, independent of the drug itself: children on a
/// solid oral form get a dosage-adjustment note, elderly patients get a
/// monitoring note.
#[derive(Debug, Clone)]
pub struct AgeKeywordPolicy {
    /// Strictly below this age counts as a child.
    pub pediatric_age: u32,
    /// Strictly above this age counts as elderly.
    pub elderly_age: u32,
    pub keywords: Vec<String>,
}

impl AgeKeywordPolicy {
    pub fn from_config(config: &DosageConfig) -> Self {
        Self {
            pediatric_age: config.pediatric_age,
            elderly_age: config.elderly_age,
            keywords: config.solid_oral_keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

impl Default for AgeKeywordPolicy {
    fn default() -> Self {
        Self::from_config(&DosageConfig::default())
    }
}

impl DosagePolicy for AgeKeywordPolicy {
    fn status(&self, age: u32, text: &str) -> String {
        let text = text.to_lowercase();
        if age < self.pediatric_age && self.keywords.iter().any(|k| text.contains(k.as_str())) {
            STATUS_CHILDREN.to_string()
        } else if age > self.elderly_age {
            STATUS_ELDERLY.to_string()
        } else {
            STATUS_APPROPRIATE.to_string()
        }
    }
}

pub struct DosageEngine {
    info: Arc<dyn DrugInfoService>,
    policy: Arc<dyn DosagePolicy>,
}

impl DosageEngine {
    pub fn new(info: Arc<dyn DrugInfoService>, policy: Arc<dyn DosagePolicy>) -> Self {
        Self { info, policy }
    }

    /// One profile per resolved drug, in input order. Unresolved entries are
    /// skipped. Lookup failures leave the affected list empty.
    pub async fn analyze(&self, drugs: &[ResolvedDrug], age: u32, raw_text: &str) -> Vec<DosageProfile> {
        let status = self.policy.status(age, raw_text);
        let tasks = drugs.iter().filter_map(|drug| {
            let rxcui = drug.rxcui.as_deref()?;
            let status = status.clone();
            Some(async move {
                let (dosage_forms, alternatives) =
                    tokio::join!(self.dosage_forms(rxcui), self.lookup_alternatives(rxcui));
                DosageProfile {
                    drug: drug.name().to_string(),
                    rxcui: rxcui.to_string(),
                    dosage_forms,
                    alternatives,
                    dosage_status: status,
                }
            })
        });
        let profiles = join_all(tasks).await;
        debug!(profiles = profiles.len(), age, "dosage analysis complete");
        profiles
    }

    async fn dosage_forms(&self, rxcui: &str) -> Vec<String> {
        match self.info.lookup_dosage_forms(rxcui).await {
            Ok(forms) => forms,
            Err(e) => {
                warn!(rxcui = rxcui, error = %e, "dosage form lookup failed");
                Vec::new()
            }
        }
    }

    /// Branded products sharing the drug's active ingredient.
    pub async fn lookup_alternatives(&self, rxcui: &str) -> Vec<String> {
        let ingredient = match self.info.lookup_ingredient(rxcui).await {
            Ok(Some(ingredient)) => ingredient,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(rxcui = rxcui, error = %e, "ingredient lookup failed");
                return Vec::new();
            }
        };
        match self.info.lookup_branded_products(&ingredient).await {
            Ok(products) => products,
            Err(e) => {
                warn!(rxcui = rxcui, ingredient = %ingredient, error = %e, "branded product lookup failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxverify_common::DrugMention;
    use rxverify_ingestion::MockDrugSource;

    fn resolved(name: &str, rxcui: Option<&str>) -> ResolvedDrug {
        ResolvedDrug { mention: DrugMention::new(name), rxcui: rxcui.map(str::to_string) }
    }

    fn source() -> MockDrugSource {
        MockDrugSource::new()
            .with_dosage_forms("11289", &["warfarin sodium 5 MG Oral Tablet"])
            .with_ingredient("11289", "11289")
            .with_branded("11289", &["Coumadin 5 MG Oral Tablet", "Jantoven 5 MG Oral Tablet"])
            .with_dosage_forms("161", &["acetaminophen 500 MG Oral Tablet"])
    }

    fn engine(source: MockDrugSource) -> DosageEngine {
        DosageEngine::new(Arc::new(source), Arc::new(AgeKeywordPolicy::default()))
    }

    #[test]
    fn test_policy_buckets() {
        let p = AgeKeywordPolicy::default();
        assert_eq!(p.status(10, "Take one TABLET daily"), STATUS_CHILDREN);
        assert_eq!(p.status(10, "amoxicillin 250mg capsule"), STATUS_CHILDREN);
        assert_eq!(p.status(10, "oral suspension 5ml"), STATUS_APPROPRIATE);
        assert_eq!(p.status(70, "Take one tablet"), STATUS_ELDERLY);
        assert_eq!(p.status(65, "anything"), STATUS_APPROPRIATE);
        assert_eq!(p.status(18, "tablet"), STATUS_APPROPRIATE);
    }

    #[test]
    fn test_policy_from_config() {
        let config = DosageConfig { pediatric_age: 12, elderly_age: 75, solid_oral_keywords: vec!["Pill".into()] };
        let p = AgeKeywordPolicy::from_config(&config);
        assert_eq!(p.status(11, "one pill"), STATUS_CHILDREN);
        assert_eq!(p.status(11, "one tablet"), STATUS_APPROPRIATE);
        assert_eq!(p.status(70, "x"), STATUS_APPROPRIATE);
    }

    #[tokio::test]
    async fn test_profiles_in_input_order_with_empty_lists() {
        let e = engine(source());
        let drugs = vec![
            resolved("Warfarin", Some("11289")),
            resolved("Nothing", None),
            resolved("Paracetamol", Some("161")),
        ];
        let profiles = e.analyze(&drugs, 70, "Warfarin 5mg").await;
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].drug, "Warfarin");
        assert_eq!(profiles[0].alternatives.len(), 2);
        assert_eq!(profiles[1].rxcui, "161");
        assert_eq!(profiles[1].dosage_forms, vec!["acetaminophen 500 MG Oral Tablet"]);
        assert!(profiles[1].alternatives.is_empty());
        assert!(profiles.iter().all(|p| p.dosage_status == STATUS_ELDERLY));
    }

    #[tokio::test]
    async fn test_lookup_failures_become_empty_lists() {
        let e = engine(source().failing());
        let profiles = e.analyze(&[resolved("Warfarin", Some("11289"))], 40, "").await;
        assert_eq!(profiles.len(), 1);
        assert!(profiles[0].dosage_forms.is_empty());
        assert!(profiles[0].alternatives.is_empty());
        assert_eq!(profiles[0].dosage_status, STATUS_APPROPRIATE);
    }
}
