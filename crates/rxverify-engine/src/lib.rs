//! rxverify-engine — prescription verification core.
//! - Identifier resolution with an LRU cache
//! - Pairwise interaction lookup against the reference dataset
//! - Dosage forms, branded alternatives and age-based dosage status
//! - The request pipeline tying extraction, resolution and analysis together

pub mod resolver;
pub mod interactions;
pub mod dosage;
pub mod pipeline;

pub use resolver::{distinct_identifiers, IdentifierResolver};
pub use interactions::{unordered_pairs, InteractionEngine};
pub use dosage::{AgeKeywordPolicy, DosageEngine, DosagePolicy};
pub use pipeline::{EntityGroup, PrescriptionAnalysis, PrescriptionPipeline};
