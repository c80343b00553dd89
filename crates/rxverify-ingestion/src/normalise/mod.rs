//! Input normalisation.
//!
//! Turns a request's `text` or base64 `image_data` into a trimmed string
//! ready for entity extraction.

pub mod text;

pub use text::{decode_image_data, PrescriptionInput, TextNormalizer};
