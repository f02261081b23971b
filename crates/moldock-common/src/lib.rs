//! moldock-common — Shared error type and SMILES validation used across all Moldock crates.

pub mod error;
pub mod smiles;

// Re-export commonly used types
pub use error::{MoldockError, Result};
pub use smiles::is_valid_smiles;
