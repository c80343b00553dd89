//! Offline drug-name recognition using an Aho-Corasick trie.
//!
//! Matches an embedded list of commonly prescribed drugs in linear time,
//! case-insensitively, rejecting hits that sit inside a longer word
//! ("aspirin" in "aspirinate"). Each hit reports the dictionary spelling.

use aho_corasick::{AhoCorasick, MatchKind};
use async_trait::async_trait;
use rxverify_common::DrugMention;
use tracing::info;

use crate::entity_types::EntityType;
use crate::{DrugExtractor, NerServiceError, Result};

const DICTIONARY_CONFIDENCE: f32 = 0.95;

/// A fast drug recognizer backed by an Aho-Corasick automaton.
pub struct DictionaryNer {
    automaton: AhoCorasick,
    /// Pattern index -> canonical display name
    canonical: Vec<String>,
    stats: DictionaryStats,
}

#[derive(Debug, Clone, Default)]
pub struct DictionaryStats {
    pub drug_count: usize,
    pub total_patterns: usize,
}

impl DictionaryNer {
    /// Build from `(pattern, canonical name)` pairs. Several patterns may map
    /// to one canonical name (brand names, regional spellings).
    pub fn from_patterns<I, P, C>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        let mut patterns: Vec<String> = Vec::new();
        let mut canonical: Vec<String> = Vec::new();
        for (pattern, name) in entries {
            let pattern = pattern.into();
            if pattern.trim().is_empty() {
                continue;
            }
            patterns.push(pattern);
            canonical.push(name.into());
        }

        // LeftmostLongest so "insulin glargine" beats "insulin"
        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .map_err(|e| NerServiceError::InvalidInput(format!("dictionary build failed: {}", e)))?;

        let mut distinct: Vec<&str> = canonical.iter().map(String::as_str).collect();
        distinct.sort_unstable();
        distinct.dedup();

        let stats = DictionaryStats {
            drug_count: distinct.len(),
            total_patterns: patterns.len(),
        };

        Ok(Self { automaton, canonical, stats })
    }

    /// Create with the embedded drug list (no file I/O).
    pub fn with_embedded_list() -> Result<Self> {
        let ner = Self::from_patterns(embedded_drugs().iter().copied())?;
        info!("DictionaryNer (embedded): {} drugs, {} patterns",
            ner.stats.drug_count, ner.stats.total_patterns);
        Ok(ner)
    }

    /// Returns the canonical names found in `text`, in order of appearance.
    pub fn extract(&self, text: &str) -> Vec<DrugMention> {
        let bytes = text.as_bytes();
        self.automaton
            .find_iter(text)
            .filter(|mat| is_word_boundary(bytes, mat.start(), mat.end()))
            .map(|mat| {
                DrugMention::new(self.canonical[mat.pattern().as_usize()].clone())
                    .with_score(DICTIONARY_CONFIDENCE)
                    .with_group(EntityType::Medicine.as_str())
            })
            .collect()
    }

    pub fn stats(&self) -> &DictionaryStats {
        &self.stats
    }
}

#[async_trait]
impl DrugExtractor for DictionaryNer {
    async fn find_drug_mentions(&self, text: &str) -> Result<Vec<DrugMention>> {
        Ok(self.extract(text))
    }

    fn name(&self) -> &str {
        "dictionary"
    }
}

fn is_word_boundary(bytes: &[u8], start: usize, end: usize) -> bool {
    let before = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
    let after = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
    before && after
}

fn embedded_drugs() -> &'static [(&'static str, &'static str)] {
    &[
        // Analgesics / anti-inflammatories
        ("paracetamol", "Paracetamol"),
        ("acetaminophen", "Acetaminophen"),
        ("tylenol", "Acetaminophen"),
        ("aspirin", "Aspirin"),
        ("ibuprofen", "Ibuprofen"),
        ("advil", "Ibuprofen"),
        ("naproxen", "Naproxen"),
        ("diclofenac", "Diclofenac"),
        ("celecoxib", "Celecoxib"),
        ("tramadol", "Tramadol"),
        ("codeine", "Codeine"),
        ("morphine", "Morphine"),
        ("oxycodone", "Oxycodone"),
        // Anticoagulants / antiplatelets
        ("warfarin", "Warfarin"),
        ("coumadin", "Warfarin"),
        ("clopidogrel", "Clopidogrel"),
        ("apixaban", "Apixaban"),
        ("rivaroxaban", "Rivaroxaban"),
        ("dabigatran", "Dabigatran"),
        ("heparin", "Heparin"),
        // Cardiovascular
        ("simvastatin", "Simvastatin"),
        ("atorvastatin", "Atorvastatin"),
        ("rosuvastatin", "Rosuvastatin"),
        ("lisinopril", "Lisinopril"),
        ("enalapril", "Enalapril"),
        ("losartan", "Losartan"),
        ("amlodipine", "Amlodipine"),
        ("metoprolol", "Metoprolol"),
        ("atenolol", "Atenolol"),
        ("digoxin", "Digoxin"),
        ("amiodarone", "Amiodarone"),
        ("furosemide", "Furosemide"),
        ("hydrochlorothiazide", "Hydrochlorothiazide"),
        ("spironolactone", "Spironolactone"),
        // Antimicrobials
        ("amoxicillin", "Amoxicillin"),
        ("clarithromycin", "Clarithromycin"),
        ("azithromycin", "Azithromycin"),
        ("erythromycin", "Erythromycin"),
        ("ciprofloxacin", "Ciprofloxacin"),
        ("doxycycline", "Doxycycline"),
        ("metronidazole", "Metronidazole"),
        ("fluconazole", "Fluconazole"),
        ("rifampin", "Rifampin"),
        ("rifampicin", "Rifampin"),
        // Endocrine
        ("metformin", "Metformin"),
        ("glipizide", "Glipizide"),
        ("insulin", "Insulin"),
        ("insulin glargine", "Insulin Glargine"),
        ("levothyroxine", "Levothyroxine"),
        ("prednisone", "Prednisone"),
        // CNS
        ("sertraline", "Sertraline"),
        ("fluoxetine", "Fluoxetine"),
        ("citalopram", "Citalopram"),
        ("amitriptyline", "Amitriptyline"),
        ("diazepam", "Diazepam"),
        ("alprazolam", "Alprazolam"),
        ("lithium", "Lithium"),
        ("carbamazepine", "Carbamazepine"),
        ("phenytoin", "Phenytoin"),
        ("gabapentin", "Gabapentin"),
        // GI / other
        ("omeprazole", "Omeprazole"),
        ("pantoprazole", "Pantoprazole"),
        ("ranitidine", "Ranitidine"),
        ("cetirizine", "Cetirizine"),
        ("montelukast", "Montelukast"),
        ("salbutamol", "Albuterol"),
        ("albuterol", "Albuterol"),
        ("sildenafil", "Sildenafil"),
        ("methotrexate", "Methotrexate"),
        ("allopurinol", "Allopurinol"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(mentions: &[DrugMention]) -> Vec<&str> {
        mentions.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_dictionary_extraction() {
        let ner = DictionaryNer::with_embedded_list().unwrap();
        let found = ner.extract("Paracetamol 500mg daily. Warfarin 10mg. Prescription for a patient over 60.");
        assert_eq!(names(&found), vec!["Paracetamol", "Warfarin"]);
        assert!(found.iter().all(|m| m.score == Some(0.95)));
        assert!(found.iter().all(|m| m.entity_group.as_deref() == Some("MEDICINE")));
    }

    #[test]
    fn test_case_insensitive_reports_canonical_spelling() {
        let ner = DictionaryNer::with_embedded_list().unwrap();
        let found = ner.extract("TYLENOL 1g prn, COUMADIN 5 mg");
        assert_eq!(names(&found), vec!["Acetaminophen", "Warfarin"]);
    }

    #[test]
    fn test_word_boundaries_respected() {
        let ner = DictionaryNer::with_embedded_list().unwrap();
        assert!(ner.extract("aspirinate and preinsulinx").is_empty());
        assert_eq!(names(&ner.extract("(aspirin)")), vec!["Aspirin"]);
    }

    #[test]
    fn test_longest_match_wins() {
        let ner = DictionaryNer::with_embedded_list().unwrap();
        assert_eq!(names(&ner.extract("Insulin glargine 10 units")), vec!["Insulin Glargine"]);
    }

    #[test]
    fn test_custom_patterns_and_stats() {
        let ner = DictionaryNer::from_patterns(vec![("foo", "Foo"), ("bar", "Foo"), ("", "Blank")]).unwrap();
        assert_eq!(ner.stats().total_patterns, 2);
        assert_eq!(ner.stats().drug_count, 1);
        assert_eq!(names(&ner.extract("bar foo")), vec!["Foo", "Foo"]);
    }

    #[test]
    fn test_no_matches_is_empty() {
        let ner = DictionaryNer::with_embedded_list().unwrap();
        assert!(ner.extract("Take two tablets with water.").is_empty());
    }
}
