//! rxverify-ingestion — getting a prescription and its reference data in.
//! - OCR collaborators (HTTP service, placeholder)
//! - Text normalisation and base64 image decoding
//! - RxNorm / RxNav client for identifier, dosage-form and product lookups
//! - Drug-drug interaction reference dataset (CSV)

pub mod dataset;
pub mod normalise;
pub mod ocr;
pub mod sources;

pub use dataset::InteractionDataset;
pub use normalise::{decode_image_data, PrescriptionInput, TextNormalizer};
pub use ocr::{HttpOcrService, OcrError, OcrService, PlaceholderOcr};
pub use sources::{DrugInfoService, IdentifierLookup, MockDrugSource, RxNormClient};
