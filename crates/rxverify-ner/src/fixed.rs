use async_trait::async_trait;
use rxverify_common::DrugMention;

use crate::{DrugExtractor, Result};

/// Returns the same drug list for any input. Used for demos and tests.
#[derive(Debug, Clone)]
pub struct FixedExtractor {
    drugs: Vec<String>,
}

impl FixedExtractor {
    pub fn new<I, S>(drugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { drugs: drugs.into_iter().map(Into::into).collect() }
    }

    /// The demo pair that matches the placeholder OCR sample.
    pub fn demo() -> Self {
        Self::new(["Paracetamol", "Warfarin"])
    }
}

#[async_trait]
impl DrugExtractor for FixedExtractor {
    async fn find_drug_mentions(&self, _text: &str) -> Result<Vec<DrugMention>> {
        Ok(self.drugs.iter().map(DrugMention::new).collect())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_ignores_input() {
        let out = FixedExtractor::demo().find_drug_mentions("").await.unwrap();
        let names: Vec<_> = out.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Paracetamol", "Warfarin"]);
    }
}
