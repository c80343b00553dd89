//! Pairwise interaction lookup.

use std::sync::Arc;

use rxverify_common::{InteractionReport, InteractionResult};
use rxverify_ingestion::InteractionDataset;
use rxverify_llm::RiskSummarizer;
use tracing::debug;

pub struct InteractionEngine {
    dataset: Arc<InteractionDataset>,
    summarizer: Arc<dyn RiskSummarizer>,
}

impl InteractionEngine {
    pub fn new(dataset: Arc<InteractionDataset>, summarizer: Arc<dyn RiskSummarizer>) -> Self {
        Self { dataset, summarizer }
    }

    pub fn dataset(&self) -> &InteractionDataset {
        &self.dataset
    }

    pub fn summarizer_name(&self) -> &str {
        self.summarizer.name()
    }

    /// Check every unordered pair of identifiers against the dataset.
    ///
    /// Duplicates are dropped first (first position kept). Results come out
    /// in pair order, then dataset row order. Fewer than two distinct
    /// identifiers is reported as `InsufficientDrugs`, not an error.
    pub async fn find_interactions(&self, identifiers: &[String]) -> InteractionReport {
        let mut ids: Vec<&str> = Vec::with_capacity(identifiers.len());
        for id in identifiers {
            if !ids.contains(&id.as_str()) {
                ids.push(id);
            }
        }
        if ids.len() < 2 {
            return InteractionReport::insufficient();
        }

        let mut results = Vec::new();
        for (a, b) in unordered_pairs(&ids) {
            for record in self.dataset.lookup(a, b) {
                let alert = self.summarizer.summarize(&record.description).await;
                results.push(InteractionResult::from_record(record, alert));
            }
        }
        debug!(identifiers = ids.len(), interactions = results.len(), "interaction check complete");
        InteractionReport::checked(results)
    }
}

/// All `(items[i], items[j])` with `i < j`, in ascending `(i, j)` order.
pub fn unordered_pairs<T: Copy>(items: &[T]) -> Vec<(T, T)> {
    let mut pairs = Vec::new();
    for (i, &a) in items.iter().enumerate() {
        for &b in &items[i + 1..] {
            pairs.push((a, b));
        }
    }
    pairs
}
