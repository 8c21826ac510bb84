//! Composer - records, totals and document composition
//!
//! This crate provides:
//! - The record model and legacy field resolution
//! - Totals under both price conventions
//! - Document variants as JSON configuration, with five built-in presets
//! - Composition of a record into a document and lowering to a render tree
//! - Export through a pluggable rendering backend
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use composer::{Exporter, Record, VariantConfig};
//! use serde_json::json;
//!
//! let record = Record::from_value(&json!({
//!     "NOS": "000.2.1.1/938/2025",
//!     "TGL": "2025-01-05",
//!     "PIHAK1": "Kusuma Atmadja",
//!     "items": [{ "Uraian": "Laptop", "Jumlah": 2, "HrgItem": "Rp 1.000,00", "PPN": 100 }]
//! }))?;
//!
//! let variant = VariantConfig::preset("bast")?;
//! let today = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
//! let file = Exporter::pdf().export(&record, &variant, today)?;
//! assert!(file.bytes.starts_with(b"%PDF"));
//! # Ok::<(), composer::ComposeError>(())
//! ```

mod composer;
mod export;
mod model;
pub mod renderer;
pub mod resolve;
mod schema;
mod totals;
pub mod variant;

pub use crate::composer::{ComposeContext, Composer, LogoSource, StaticLogo, LOGO_PLACEHOLDER};
pub use export::{sanitize_file_name, ExportedFile, Exporter, UNSAFE_FILE_NAME_CHARS};
pub use model::{LineItem, Party, Record, IMAGE_SLOTS};
pub use renderer::DocumentRenderer;
pub use schema::*;
pub use totals::{LineTotals, PriceConvention, Totals};
pub use variant::{PartyRef, TextCase, VariantConfig};

use thiserror::Error;

/// Errors that can occur while composing or exporting documents
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid variant: {0}")]
    InvalidVariant(String),

    #[error("Unknown variant: {0}")]
    UnknownVariant(String),

    #[error("Rendering backend is not loaded")]
    BackendUnavailable,

    #[error("Logo unavailable: {0}")]
    LogoUnavailable(String),

    #[error("Render error: {0}")]
    Render(#[from] doc_core::DocError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for composition operations
pub type Result<T> = std::result::Result<T, ComposeError>;
