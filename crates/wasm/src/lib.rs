//! WASM bindings for bapgen
//!
//! This crate provides a JavaScript-friendly API for:
//! - Indonesian amount formatting, terbilang and dates
//! - Record validation and image upload ingestion
//! - Exporting a record as a downloadable document
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { Exporter, Formatter, ingestImage, validateRecord } from 'bapgen-wasm';
//!
//! await init();
//!
//! Formatter.parseAmount("Rp 1.234.567,89"); // 1234567.89
//! Formatter.terbilang(1700);                // "Seribu Tujuh Ratus Rupiah"
//!
//! const errors = validateRecord(record);    // [] when valid
//! item.Image = ingestImage(bytes, file.type);
//!
//! const exporter = new Exporter();
//! exporter.setLogo(logoBytes);
//! const file = exporter.exportRecord(record, "bast", "2025-01-05");
//! download(file.bytes, file.fileName, file.mimeType);
//! ```

mod logger;

use composer::{Record, StaticLogo, VariantConfig};
use doc_core::PageSetup;
use serde::Serialize;
use serde_json::{json, Value};
use wasm_bindgen::prelude::*;

// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logger::install(log::LevelFilter::Warn);
}

/// Enable debug output in the browser console
#[wasm_bindgen(js_name = setVerbose)]
pub fn set_verbose(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    logger::install(level);
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Convert to a plain JS object (not a `Map`)
fn to_js(value: &Value) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(to_js_error)
}

fn record_from_js(record: JsValue) -> Result<Record, JsValue> {
    let value: Value = serde_wasm_bindgen::from_value(record)?;
    Record::from_value(&value).map_err(to_js_error)
}

/// Indonesian formatting utilities
#[wasm_bindgen]
pub struct Formatter;

#[wasm_bindgen]
impl Formatter {
    /// Parse an amount in Indonesian or international notation
    ///
    /// @param input - e.g. "Rp 1.234.567,89" or "1,234,567.89"
    /// @returns The value, or 0 when unparseable
    #[wasm_bindgen(js_name = parseAmount)]
    pub fn parse_amount(input: &str) -> f64 {
        indo_text::parse_amount(input)
    }

    /// Format with `.` thousands and an optional `,` fraction
    ///
    /// @param value - Amount
    /// @param decimals - 0 or 2
    /// @returns e.g. "1.234.567,50"
    #[wasm_bindgen(js_name = formatAmount)]
    pub fn format_amount(value: f64, decimals: u8) -> String {
        indo_text::format_amount(value, decimals)
    }

    /// @returns e.g. "Rp 1.700"
    #[wasm_bindgen(js_name = formatRupiah)]
    pub fn format_rupiah(value: f64) -> String {
        indo_text::format_rupiah(value)
    }

    /// Spell an amount in words
    ///
    /// @param amount - Rounded to whole rupiah
    /// @returns e.g. "Seribu Tujuh Ratus Rupiah"
    pub fn terbilang(amount: f64) -> String {
        indo_text::rupiah_words(amount)
    }

    /// Spell a whole number without the currency
    ///
    /// @param n - Negative values count as 0
    #[wasm_bindgen(js_name = toWords)]
    pub fn to_words(n: f64) -> String {
        indo_text::to_words(n.max(0.0).round() as u64)
    }

    /// Long Indonesian date
    ///
    /// @param iso - "YYYY-MM-DD"
    /// @returns e.g. "05 Januari 2025"
    #[wasm_bindgen(js_name = formatDate)]
    pub fn format_date(iso: &str) -> Result<String, JsValue> {
        let date = indo_text::parse_iso_date(iso).map_err(to_js_error)?;
        Ok(indo_text::format_date_long(date))
    }
}

/// Validate a record object as stored by the form
///
/// Item quantities are checked as entered, so `0` or `-3` is reported
/// rather than read as 1.
///
/// @param record - Record object (legacy keys accepted)
/// @returns Array of `{ field, message, suggestion }`, empty when valid
#[wasm_bindgen(js_name = validateRecord)]
pub fn validate_record(record: JsValue) -> Result<JsValue, JsValue> {
    let value: Value = serde_wasm_bindgen::from_value(record)?;
    let errors: Vec<Value> = match records::validate_value(&value) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .iter()
            .map(|e| {
                json!({
                    "field": e.field,
                    "message": e.message,
                    "suggestion": e.suggestion,
                })
            })
            .collect(),
    };
    to_js(&Value::Array(errors))
}

/// Turn an uploaded file into an image data URI
///
/// @param bytes - File contents (Uint8Array)
/// @param mime - File MIME type
/// @returns "data:<mime>;base64,..."
#[wasm_bindgen(js_name = ingestImage)]
pub fn ingest_image(bytes: &[u8], mime: &str) -> Result<String, JsValue> {
    records::ingest_image(bytes, mime).map_err(to_js_error)
}

/// Keys of the built-in document variants
#[wasm_bindgen(js_name = variantKeys)]
pub fn variant_keys() -> js_sys::Array {
    VariantConfig::preset_keys().map(JsValue::from_str).collect()
}

/// A produced document
#[wasm_bindgen]
pub struct ExportResult {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

#[wasm_bindgen]
impl ExportResult {
    #[wasm_bindgen(getter, js_name = fileName)]
    pub fn file_name(&self) -> String {
        self.file_name.clone()
    }

    #[wasm_bindgen(getter, js_name = mimeType)]
    pub fn mime_type(&self) -> String {
        self.mime_type.clone()
    }

    /// Document bytes (Uint8Array)
    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

/// Record exporter using the PDF backend
#[wasm_bindgen]
pub struct Exporter {
    inner: composer::Exporter,
}

#[wasm_bindgen]
impl Exporter {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Exporter {
        Exporter {
            inner: composer::Exporter::pdf(),
        }
    }

    /// Set the letterhead logo
    ///
    /// @param data - JPEG or PNG bytes (Uint8Array); empty bytes fall back to a placeholder
    #[wasm_bindgen(js_name = setLogo)]
    pub fn set_logo(&mut self, data: &[u8]) {
        self.inner.set_logo(StaticLogo(data.to_vec()));
    }

    /// Override page geometry
    ///
    /// @param json - Partial page setup, e.g. `{"font_size": 11}`
    #[wasm_bindgen(js_name = setPageSetup)]
    pub fn set_page_setup(&mut self, json: &str) -> Result<(), JsValue> {
        let setup = PageSetup::from_json(json).map_err(to_js_error)?;
        self.inner = std::mem::take(&mut self.inner).page_setup(setup);
        Ok(())
    }

    /// Export a record with a built-in variant
    ///
    /// @param record - Record object
    /// @param variant - Variant key, see `variantKeys()`
    /// @param today - "YYYY-MM-DD", used when the record has no date
    #[wasm_bindgen(js_name = exportRecord)]
    pub fn export_record(
        &self,
        record: JsValue,
        variant: &str,
        today: &str,
    ) -> Result<ExportResult, JsValue> {
        let variant = VariantConfig::preset(variant).map_err(to_js_error)?;
        self.export(record, &variant, today)
    }

    /// Export a record with a variant given as JSON
    #[wasm_bindgen(js_name = exportWithVariant)]
    pub fn export_with_variant(
        &self,
        record: JsValue,
        variant_json: &str,
        today: &str,
    ) -> Result<ExportResult, JsValue> {
        let variant = VariantConfig::from_json(variant_json).map_err(to_js_error)?;
        self.export(record, &variant, today)
    }

    fn export(
        &self,
        record: JsValue,
        variant: &VariantConfig,
        today: &str,
    ) -> Result<ExportResult, JsValue> {
        let record = record_from_js(record)?;
        let today = indo_text::parse_iso_date(today).map_err(to_js_error)?;
        let file = self
            .inner
            .export(&record, variant, today)
            .map_err(to_js_error)?;

        Ok(ExportResult {
            file_name: file.file_name,
            mime_type: file.mime_type,
            bytes: file.bytes,
        })
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_formatter() {
        assert_eq!(Formatter::parse_amount("Rp 1.234.567,89"), 1234567.89);
        assert_eq!(Formatter::format_amount(1234567.5, 2), "1.234.567,50");
        assert_eq!(Formatter::format_rupiah(1700.0), "Rp 1.700");
        assert_eq!(Formatter::terbilang(1700.0), "Seribu Tujuh Ratus Rupiah");
        assert_eq!(Formatter::to_words(11.0), "Sebelas");
    }

    #[wasm_bindgen_test]
    fn test_format_date() {
        assert_eq!(Formatter::format_date("2025-01-05").unwrap(), "05 Januari 2025");
    }

    #[wasm_bindgen_test]
    fn test_ingest_image() {
        assert_eq!(
            ingest_image(&[1, 2, 3], "image/jpeg").unwrap(),
            "data:image/jpeg;base64,AQID"
        );
    }
}
