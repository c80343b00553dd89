//! Entity group classification and normalization.

use std::collections::HashMap;

/// Normalized entity group for clinical NER output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EntityType {
    Medicine,
    Dosage,
    Frequency,
    Route,
    Duration,
    Disease,
    Age,
    Other,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Medicine => "MEDICINE",
            EntityType::Dosage => "DOSAGE",
            EntityType::Frequency => "FREQUENCY",
            EntityType::Route => "ROUTE",
            EntityType::Duration => "DURATION",
            EntityType::Disease => "DISEASE",
            EntityType::Age => "AGE",
            EntityType::Other => "OTHER",
        }
    }
}

// Map model-specific labels to normalized groups, keyed upper-case
fn get_label_map() -> &'static HashMap<&'static str, EntityType> {
    use std::sync::OnceLock;
    static LABEL_MAP: OnceLock<HashMap<&'static str, EntityType>> = OnceLock::new();
    LABEL_MAP.get_or_init(|| {
        let mut m = HashMap::new();

        // Clinical medication NER labels
        m.insert("MEDICINE", EntityType::Medicine);
        m.insert("MEDICATION", EntityType::Medicine);
        m.insert("DRUG", EntityType::Medicine);
        m.insert("CHEMICAL", EntityType::Medicine);
        m.insert("DOSAGE", EntityType::Dosage);
        m.insert("STRENGTH", EntityType::Dosage);
        m.insert("FREQUENCY", EntityType::Frequency);
        m.insert("ROUTE", EntityType::Route);
        m.insert("ADMINISTRATION", EntityType::Route);
        m.insert("DURATION", EntityType::Duration);

        // Biomedical NER labels
        m.insert("DISEASE_DISORDER", EntityType::Disease);
        m.insert("DISEASE", EntityType::Disease);
        m.insert("SIGN_SYMPTOM", EntityType::Disease);
        m.insert("AGE", EntityType::Age);

        m
    })
}

/// Strip a BIO prefix (`B-`, `I-`) and surrounding whitespace.
pub fn strip_bio_prefix(label: &str) -> &str {
    let label = label.trim();
    label
        .strip_prefix("B-")
        .or_else(|| label.strip_prefix("I-"))
        .unwrap_or(label)
}

/// Normalize a raw model label (with or without BIO prefix, any case) to an [`EntityType`].
pub fn normalize_entity_label(label: &str) -> EntityType {
    let clean_label = strip_bio_prefix(label).to_ascii_uppercase();

    get_label_map()
        .get(clean_label.as_str())
        .copied()
        .unwrap_or(EntityType::Other)
}
