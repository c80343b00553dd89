//! rxverify-web — HTTP API for prescription verification.
//! Exposes:
//!   - OCR of prescription images
//!   - Drug-drug interaction checks
//!   - Dosage forms, alternatives and age-based dosage status
//!   - Combined text / file analysis
//!   - Health status

pub mod router;
pub mod handlers;
pub mod state;
