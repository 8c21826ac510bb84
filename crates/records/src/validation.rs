//! Record validation
//!
//! Errors carry the offending field key, an Indonesian message for the user
//! and an optional hint on how to fix it. All problems are collected at once.

use composer::resolve::{fields, resolve_first, value_to_string};
use composer::Record;
use serde_json::Value;
use std::fmt;

/// One failed check
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Record field key ("reference_number", "items[0].quantity")
    pub field: String,
    /// Message shown to the user
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Required field left empty
    pub fn required(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} wajib diisi", label))
            .with_suggestion(format!("Mohon isi {}", label.to_lowercase()))
    }

    pub fn invalid_quantity(field: &str, value: &str) -> Self {
        Self::new(field, format!("Jumlah '{}' tidak valid", value))
            .with_suggestion("Jumlah harus bilangan bulat minimal 1")
    }

    pub fn negative_amount(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} tidak boleh negatif", label))
    }

    pub fn invalid_date(field: &str, value: &str) -> Self {
        Self::new(field, format!("Format tanggal '{}' tidak valid", value))
            .with_suggestion("Gunakan format YYYY-MM-DD, contoh: 2025-01-05")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Every problem found in one record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Whether a field has at least one error
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok` when nothing was collected
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Check a record before it is persisted
///
/// Reference number and first party name are required; item amounts must
/// not be negative.
pub fn validate_record(record: &Record) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if record.reference_number.trim().is_empty() {
        errors.add(ValidationError::required("reference_number", "No Surat"));
    }
    if record.party1.name.trim().is_empty() {
        errors.add(ValidationError::required("party1.name", "Pihak Kesatu"));
    }

    for (index, item) in record.items.iter().enumerate() {
        if item.unit_price < 0.0 {
            errors.add(ValidationError::negative_amount(
                &format!("items[{}].unit_price", index),
                "Harga",
            ));
        }
        if item.unit_tax < 0.0 {
            errors.add(ValidationError::negative_amount(
                &format!("items[{}].unit_tax", index),
                "PPN",
            ));
        }
    }

    errors.into_result()
}

/// Check a record object as stored or submitted
///
/// Item quantities are checked as written, before [`Record::from_value`]
/// turns unusable ones into 1; the resolved record then goes through
/// [`validate_record`].
pub fn validate_value(data: &Value) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let record = match Record::from_value(data) {
        Ok(record) => record,
        Err(err) => {
            errors.add(
                ValidationError::new("record", err.to_string())
                    .with_suggestion("Kirim data record sebagai objek"),
            );
            return errors.into_result();
        }
    };

    let listed = resolve_first(fields::ITEMS, data)
        .and_then(Value::as_array)
        .filter(|list| !list.is_empty());
    let quantities: Vec<Option<&Value>> = match listed {
        Some(list) => list
            .iter()
            .map(|item| resolve_first(fields::ITEM_QUANTITY, item))
            .collect(),
        None => vec![resolve_first(fields::LEGACY_ITEM_QUANTITY, data)],
    };
    for (index, quantity) in quantities.into_iter().enumerate() {
        if let Some(value) = quantity.filter(|v| !is_whole_quantity(v)) {
            errors.add(ValidationError::invalid_quantity(
                &format!("items[{}].quantity", index),
                value_to_string(value).trim(),
            ));
        }
    }

    if let Err(more) = validate_record(&record) {
        for error in more.iter() {
            errors.add(error.clone());
        }
    }
    errors.into_result()
}

/// A whole number of at least 1, as a JSON number or a numeric string
fn is_whole_quantity(value: &Value) -> bool {
    match value {
        Value::Number(n) => n
            .as_f64()
            .is_some_and(|q| q.is_finite() && q >= 1.0 && q.fract() == 0.0),
        Value::String(s) => matches!(s.trim().parse::<u32>(), Ok(q) if q >= 1),
        _ => false,
    }
}
