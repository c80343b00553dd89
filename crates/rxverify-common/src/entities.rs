/// Core entity types flowing through the prescription pipeline.
/// All of them are per-request values except `InteractionRecord`, which
/// lives in the read-only reference dataset.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Drug mention
// ---------------------------------------------------------------------------

/// A drug name as surfaced by extraction. Not validated; may be misspelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugMention {
    pub name: String,
    /// Extraction confidence, when the extractor reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// Entity group label from the extractor (e.g. MEDICINE).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_group: Option<String>,
}

impl DrugMention {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), score: None, entity_group: None }
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.entity_group = Some(group.into());
        self
    }

    /// Case-insensitive key used for de-duplication and caching.
    pub fn key(&self) -> String {
        mention_key(&self.name)
    }
}

pub fn mention_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// De-duplicate mentions case-insensitively, keeping the first spelling and
/// first-appearance order. The highest score seen for a name is retained.
pub fn dedup_mentions(mentions: Vec<DrugMention>) -> Vec<DrugMention> {
    let mut out: Vec<DrugMention> = Vec::with_capacity(mentions.len());
    for mention in mentions {
        if mention.name.trim().is_empty() {
            continue;
        }
        let key = mention.key();
        match out.iter_mut().find(|m| m.key() == key) {
            Some(existing) => {
                if mention.score > existing.score {
                    existing.score = mention.score;
                }
            }
            None => out.push(mention),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Resolved drug
// ---------------------------------------------------------------------------

/// A mention paired with at most one canonical identifier (RxCUI).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDrug {
    pub mention: DrugMention,
    pub rxcui: Option<String>,
}

impl ResolvedDrug {
    pub fn is_resolved(&self) -> bool {
        self.rxcui.is_some()
    }

    pub fn name(&self) -> &str {
        &self.mention.name
    }
}

// ---------------------------------------------------------------------------
// Interaction record / result
// ---------------------------------------------------------------------------

/// One row of the reference interaction table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub rxcui_a: String,
    pub rxcui_b: String,
    pub drug_a: String,
    pub drug_b: String,
    pub description: String,
}

impl InteractionRecord {
    /// True when the record links `x` and `y`, in either order.
    pub fn matches(&self, x: &str, y: &str) -> bool {
        (self.rxcui_a == x && self.rxcui_b == y) || (self.rxcui_a == y && self.rxcui_b == x)
    }

    /// Order-normalised key for an unordered identifier pair.
    pub fn pair_key(x: &str, y: &str) -> (String, String) {
        if x <= y {
            (x.to_string(), y.to_string())
        } else {
            (y.to_string(), x.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResult {
    pub drug1: String,
    pub drug2: String,
    pub rxcui1: String,
    pub rxcui2: String,
    pub description: String,
    pub alert: String,
    pub alert_level: AlertLevel,
}

impl InteractionResult {
    pub fn from_record(record: &InteractionRecord, alert: Alert) -> Self {
        Self {
            drug1: record.drug_a.clone(),
            drug2: record.drug_b.clone(),
            rxcui1: record.rxcui_a.clone(),
            rxcui2: record.rxcui_b.clone(),
            description: record.description.clone(),
            alert: alert.message,
            alert_level: alert.level,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    Checked,
    /// Fewer than two distinct identifiers; nothing to pair.
    InsufficientDrugs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionReport {
    pub status: InteractionStatus,
    pub interactions: Vec<InteractionResult>,
}

impl InteractionReport {
    pub fn insufficient() -> Self {
        Self { status: InteractionStatus::InsufficientDrugs, interactions: Vec::new() }
    }

    pub fn checked(interactions: Vec<InteractionResult>) -> Self {
        Self { status: InteractionStatus::Checked, interactions }
    }

    pub fn message(&self) -> &'static str {
        match self.status {
            InteractionStatus::Checked => "Interactions checked successfully.",
            InteractionStatus::InsufficientDrugs => {
                "Not enough drugs with RxCUIs found to check for interactions."
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Alert
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Severe,
    HighRisk,
    NoSevereRisk,
}

impl AlertLevel {
    /// Fixed human-readable message for this bucket.
    pub fn message(&self) -> &'static str {
        match self {
            AlertLevel::Severe       => "❗️ Severe interaction detected. Immediate consultation advised.",
            AlertLevel::HighRisk     => "⚠️ High-risk interaction detected. Use with caution.",
            AlertLevel::NoSevereRisk => "✅ No severe interaction risk detected. Monitor patient as usual.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Severe       => "severe",
            AlertLevel::HighRisk     => "high_risk",
            AlertLevel::NoSevereRisk => "no_severe_risk",
        }
    }
}

/// Advisory severity attached to an interaction description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

impl Alert {
    pub fn new(level: AlertLevel) -> Self {
        Self { level, message: level.message().to_string() }
    }
}

impl From<AlertLevel> for Alert {
    fn from(level: AlertLevel) -> Self {
        Alert::new(level)
    }
}

// ---------------------------------------------------------------------------
// Dosage profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosageProfile {
    pub drug: String,
    pub rxcui: String,
    pub dosage_forms: Vec<String>,
    pub alternatives: Vec<String>,
    pub dosage_status: String,
}
