//! Records - storage, validation and the application controller
//!
//! This crate provides:
//! - The [`RecordStore`] interface and an in-memory implementation
//! - Record validation with Indonesian user-facing messages
//! - A pure form reducer with live totals
//! - Load-with-retry, pagination and search over the cached record list
//! - Image ingestion into data URIs
//!
//! # Example
//!
//! ```
//! use records::{App, FormEvent, FormState, HeaderField, ItemField, MemoryStore};
//!
//! let mut app = App::new(MemoryStore::new());
//! app.load()?;
//!
//! let form = [
//!     FormEvent::SetField(HeaderField::ReferenceNumber, "027/BAP/2025".into()),
//!     FormEvent::SetField(HeaderField::Party1Name, "Kusuma Atmadja".into()),
//!     FormEvent::SetItemField(0, ItemField::Description, "Laptop".into()),
//! ]
//! .into_iter()
//! .fold(FormState::new(), FormState::reduce);
//!
//! let id = app.save(&form)?;
//! assert_eq!(app.get(id).map(|r| r.reference_number.as_str()), Some("027/BAP/2025"));
//! # Ok::<(), records::RecordsError>(())
//! ```

mod app;
mod form;
mod ingest;
mod retry;
mod store;
mod validation;

pub use app::{App, Page, DEFAULT_PER_PAGE};
pub use form::{FormEvent, FormItem, FormState, HeaderField, ItemField};
pub use ingest::{ingest_image, MAX_IMAGE_BYTES};
pub use retry::{RetryPolicy, Sleeper, ThreadSleeper};
pub use store::{MemoryStore, RecordStore, StoreError};
pub use validation::{validate_record, validate_value, ValidationError, ValidationErrors};

use thiserror::Error;

/// Errors surfaced to the user by record operations
#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("Validasi gagal: {0}")]
    Validation(ValidationErrors),

    #[error("Gagal mengakses penyimpanan: {0}")]
    Store(#[from] StoreError),

    #[error("Gagal memuat data setelah {attempts} percobaan: {source}")]
    LoadFailed {
        attempts: u32,
        #[source]
        source: StoreError,
    },

    #[error("Data tidak ditemukan: {0}")]
    NotFound(u64),

    #[error("Ukuran file terlalu besar! Maksimal 5MB ({0} byte)")]
    ImageTooLarge(usize),

    #[error("File harus berupa gambar! ({0})")]
    NotAnImage(String),

    #[error("Gagal membuat dokumen: {0}")]
    Export(#[from] composer::ComposeError),
}

impl From<ValidationErrors> for RecordsError {
    fn from(errors: ValidationErrors) -> Self {
        RecordsError::Validation(errors)
    }
}

/// Result type for record operations
pub type Result<T> = std::result::Result<T, RecordsError>;
