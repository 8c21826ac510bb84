//! Indo Text - Indonesian locale text for official documents
//!
//! This crate provides:
//! - Rupiah amount parsing in either Indonesian or international notation
//! - Rupiah amount formatting (`1.234.567,50`)
//! - Indonesian number spelling ("terbilang": Satu, Dua, Tiga...)
//! - Indonesian calendar names and date narration
//! - Title-casing with an acronym allow-list
//!
//! # Example
//!
//! ```
//! use indo_text::{format_amount, parse_amount, rupiah_words, to_words};
//!
//! let value = parse_amount("Rp 1.234.567,50");
//! assert_eq!(format_amount(value, 2), "1.234.567,50");
//! assert_eq!(to_words(2023), "Dua Ribu Dua Puluh Tiga");
//! assert_eq!(rupiah_words(1700.0), "Seribu Tujuh Ratus Rupiah");
//! ```

mod calendar;
mod casing;
mod formatter;
mod terbilang;

pub use formatter::IndoFormatter;

pub use calendar::{
    format_date_long, month_name, parse_iso_date, weekday_name, DateNarration, MONTH_NAMES,
    WEEKDAY_NAMES,
};
pub use casing::{title_case, title_case_with_acronyms, DEFAULT_ACRONYMS};
pub use formatter::{format_amount, format_rupiah, parse_amount, MAX_AMOUNT};
pub use terbilang::{capitalize_first, rupiah_words, to_words, UNSPELLABLE_FROM};

use thiserror::Error;

/// Errors that can occur during Indonesian text processing
#[derive(Debug, Error)]
pub enum IndoTextError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Result type for Indonesian text operations
pub type Result<T> = std::result::Result<T, IndoTextError>;
