//! Drug name → RxCUI resolution.
//!
//! Lookup failures and misses both resolve to `None`; neither is an error.
//! Hits and misses are cached by trimmed, lower-cased name. Transport errors
//! are not cached so a later request can retry.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::join_all;
use lru::LruCache;
use rxverify_common::{mention_key, DrugMention, ResolvedDrug};
use rxverify_ingestion::IdentifierLookup;
use tracing::{debug, warn};

pub struct IdentifierResolver {
    lookup: Arc<dyn IdentifierLookup>,
    cache: Option<Mutex<LruCache<String, Option<String>>>>,
}

impl IdentifierResolver {
    /// `cache_capacity` of 0 disables caching.
    pub fn new(lookup: Arc<dyn IdentifierLookup>, cache_capacity: usize) -> Self {
        let cache = NonZeroUsize::new(cache_capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        Self { lookup, cache }
    }

    pub fn lookup_name(&self) -> &str {
        self.lookup.name()
    }

    pub async fn resolve(&self, name: &str) -> Option<String> {
        let key = mention_key(name);
        if key.is_empty() {
            return None;
        }
        self.resolve_keyed(&key, name.trim()).await
    }

    /// Cache under `key`; query the backend with `name` as spelled.
    async fn resolve_keyed(&self, key: &str, name: &str) -> Option<String> {
        if let Some(cache) = &self.cache {
            let mut guard = cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = guard.get(key) {
                debug!(name = %key, rxcui = ?hit, "resolution cache hit");
                return hit.clone();
            }
        }

        match self.lookup.lookup_identifier(name).await {
            Ok(rxcui) => {
                if let Some(cache) = &self.cache {
                    cache
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .put(key.to_string(), rxcui.clone());
                }
                rxcui
            }
            Err(e) => {
                warn!(name = name, error = %e, "identifier lookup failed");
                None
            }
        }
    }

    /// Resolve every mention, in input order. Each distinct name is looked up
    /// once; lookups run concurrently.
    pub async fn resolve_all(&self, mentions: &[DrugMention]) -> Vec<ResolvedDrug> {
        // (key, first spelling) per distinct name
        let mut distinct: Vec<(String, &str)> = Vec::new();
        for m in mentions {
            let key = m.key();
            if !key.is_empty() && !distinct.iter().any(|(k, _)| *k == key) {
                distinct.push((key, m.name.trim()));
            }
        }

        let results = join_all(distinct.iter().map(|(key, name)| self.resolve_keyed(key, name))).await;
        let by_key: HashMap<&String, Option<String>> =
            distinct.iter().map(|(key, _)| key).zip(results).collect();

        mentions
            .iter()
            .map(|m| ResolvedDrug {
                mention: m.clone(),
                rxcui: by_key.get(&m.key()).cloned().flatten(),
            })
            .collect()
    }
}

/// Resolved drugs only, one per identifier, first occurrence kept.
pub fn distinct_identifiers(resolved: &[ResolvedDrug]) -> Vec<ResolvedDrug> {
    let mut seen: Vec<&str> = Vec::new();
    let mut out = Vec::new();
    for drug in resolved {
        if let Some(id) = drug.rxcui.as_deref() {
            if !seen.contains(&id) {
                seen.push(id);
                out.push(drug.clone());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxverify_ingestion::MockDrugSource;

    fn source() -> Arc<MockDrugSource> {
        Arc::new(
            MockDrugSource::new()
                .with("Warfarin", "11289")
                .with("Coumadin", "11289")
                .with("Paracetamol", "161"),
        )
    }

    #[tokio::test]
    async fn test_resolve_twice_uncached_hits_backend_twice() {
        let src = source();
        let resolver = IdentifierResolver::new(src.clone(), 0);
        assert_eq!(resolver.resolve("Warfarin").await, Some("11289".into()));
        assert_eq!(resolver.resolve("Warfarin").await, Some("11289".into()));
        assert_eq!(src.lookup_calls(), 2);
    }

    #[tokio::test]
    async fn test_resolve_cached_hits_backend_once() {
        let src = source();
        let resolver = IdentifierResolver::new(src.clone(), 16);
        assert_eq!(resolver.resolve("Warfarin").await, Some("11289".into()));
        assert_eq!(resolver.resolve(" warfarin ").await, Some("11289".into()));
        assert_eq!(resolver.resolve("Unknownium").await, None);
        assert_eq!(resolver.resolve("UNKNOWNIUM").await, None);
        assert_eq!(src.lookup_calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_none_and_not_cached() {
        let src = Arc::new(MockDrugSource::new().with("Warfarin", "11289").failing());
        let resolver = IdentifierResolver::new(src.clone(), 16);
        assert_eq!(resolver.resolve("Warfarin").await, None);
        assert_eq!(resolver.resolve("Warfarin").await, None);
        assert_eq!(src.lookup_calls(), 2);
    }

    #[tokio::test]
    async fn test_blank_name_skips_lookup() {
        let src = source();
        let resolver = IdentifierResolver::new(src.clone(), 0);
        assert_eq!(resolver.resolve("   ").await, None);
        assert_eq!(src.lookup_calls(), 0);
    }

    #[tokio::test]
    async fn test_resolve_all_keeps_order_and_misses() {
        let src = source();
        let resolver = IdentifierResolver::new(src.clone(), 0);
        let mentions = vec![
            DrugMention::new("Paracetamol"),
            DrugMention::new("Mysterymab"),
            DrugMention::new("Warfarin"),
            DrugMention::new("warfarin"),
        ];
        let resolved = resolver.resolve_all(&mentions).await;
        assert_eq!(resolved.len(), 4);
        assert_eq!(resolved[0].rxcui.as_deref(), Some("161"));
        assert!(!resolved[1].is_resolved());
        assert_eq!(resolved[3].rxcui.as_deref(), Some("11289"));
        assert_eq!(src.lookup_calls(), 3);
    }

    #[tokio::test]
    async fn test_resolve_all_queries_original_spelling() {
        let src = source();
        let resolver = IdentifierResolver::new(src.clone(), 16);
        let mentions = vec![
            DrugMention::new(" Warfarin "),
            DrugMention::new("WARFARIN"),
            DrugMention::new("Paracetamol"),
        ];
        let resolved = resolver.resolve_all(&mentions).await;
        assert_eq!(resolved[1].rxcui.as_deref(), Some("11289"));
        assert_eq!(src.queried_names(), vec!["Warfarin", "Paracetamol"]);
        assert_eq!(resolver.resolve("warfarin").await, Some("11289".into()));
        assert_eq!(src.lookup_calls(), 2);
    }

    #[tokio::test]
    async fn test_distinct_identifiers_collapses_synonyms() {
        let resolver = IdentifierResolver::new(source(), 0);
        let mentions = vec![
            DrugMention::new("Coumadin"),
            DrugMention::new("Paracetamol"),
            DrugMention::new("Warfarin"),
            DrugMention::new("Unknownium"),
        ];
        let resolved = resolver.resolve_all(&mentions).await;
        let distinct = distinct_identifiers(&resolved);
        let names: Vec<_> = distinct.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["Coumadin", "Paracetamol"]);
    }
}
