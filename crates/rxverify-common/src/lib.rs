//! rxverify-common — Shared types, errors, and the sandboxed HTTP client used
//! across all RxVerify crates.

pub mod error;
pub mod entities;
pub mod sandbox;

// Re-export commonly used types
pub use entities::{
    Alert, AlertLevel, DosageProfile, DrugMention, InteractionRecord, InteractionReport,
    InteractionResult, InteractionStatus, ResolvedDrug, dedup_mentions, mention_key,
};
pub use error::{ApiError, Result, RxVerifyError};
pub use sandbox::{HttpPolicy, SandboxClient};
