//! Drug-drug interaction reference table.
//!
//! Loaded once at startup from a CSV with the columns
//! `Drug 1, Drug 2, Interaction Description, RxCUI_1, RxCUI_2`
//! (header match is case-insensitive; extra columns are ignored).
//! Rows are indexed by an order-normalised identifier pair so a lookup
//! costs one hash probe and still returns rows in file order.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use rxverify_common::{InteractionRecord, Result, RxVerifyError};
use tracing::{debug, info, warn};

const COL_DRUG_1: &str = "drug 1";
const COL_DRUG_2: &str = "drug 2";
const COL_DESCRIPTION: &str = "interaction description";
const COL_RXCUI_1: &str = "rxcui_1";
const COL_RXCUI_2: &str = "rxcui_2";

#[derive(Debug, Default)]
pub struct InteractionDataset {
    records: Vec<InteractionRecord>,
    /// (min id, max id) -> row indices, ascending
    index: HashMap<(String, String), Vec<usize>>,
}

impl InteractionDataset {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<InteractionRecord>) -> Self {
        let mut index: HashMap<(String, String), Vec<usize>> = HashMap::new();
        for (i, r) in records.iter().enumerate() {
            index
                .entry(InteractionRecord::pair_key(&r.rxcui_a, &r.rxcui_b))
                .or_default()
                .push(i);
        }
        Self { records, index }
    }

    /// Load from a CSV file. Any failure is `DatasetUnavailable`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading interaction dataset from {:?}", path);
        let file = std::fs::File::open(path)
            .map_err(|e| RxVerifyError::DatasetUnavailable(format!("{}: {}", path.display(), e)))?;
        let dataset = Self::from_reader(file)?;
        info!("Loaded {} interaction records from {:?}", dataset.len(), path);
        Ok(dataset)
    }

    /// Load, or start empty with a warning when the file is missing or bad.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(dataset) => dataset,
            Err(e) => {
                warn!(error = %e, "interaction dataset unavailable, continuing with no records");
                Self::empty()
            }
        }
    }

    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_reader(content.as_bytes())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| RxVerifyError::DatasetUnavailable(format!("unreadable header: {}", e)))?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let col = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| RxVerifyError::DatasetUnavailable(format!("missing column '{}'", name)))
        };
        let drug_1 = col(COL_DRUG_1)?;
        let drug_2 = col(COL_DRUG_2)?;
        let description = col(COL_DESCRIPTION)?;
        let rxcui_1 = col(COL_RXCUI_1)?;
        let rxcui_2 = col(COL_RXCUI_2)?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for result in reader.records() {
            let row = result
                .map_err(|e| RxVerifyError::DatasetUnavailable(format!("malformed row: {}", e)))?;
            let field = |i: usize| row.get(i).unwrap_or("").trim().to_string();

            let rxcui_a = normalize_rxcui(&field(rxcui_1));
            let rxcui_b = normalize_rxcui(&field(rxcui_2));
            if rxcui_a.is_empty() || rxcui_b.is_empty() {
                skipped += 1;
                continue;
            }
            records.push(InteractionRecord {
                rxcui_a,
                rxcui_b,
                drug_a: field(drug_1),
                drug_b: field(drug_2),
                description: field(description),
            });
        }
        if skipped > 0 {
            debug!("Skipped {} rows without identifiers", skipped);
        }
        Ok(Self::from_records(records))
    }

    /// Every record linking `x` and `y` in either order, in file order.
    pub fn lookup(&self, x: &str, y: &str) -> Vec<&InteractionRecord> {
        self.index
            .get(&InteractionRecord::pair_key(x, y))
            .map(|rows| rows.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Spreadsheet exports often write integer ids as floats ("11289.0").
fn normalize_rxcui(raw: &str) -> String {
    let raw = raw.trim();
    match raw.strip_suffix(".0") {
        Some(int) if !int.is_empty() && int.chars().all(|c| c.is_ascii_digit()) => int.to_string(),
        _ => raw.to_string(),
    }
}
