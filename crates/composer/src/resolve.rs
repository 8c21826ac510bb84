//! Field resolution for persisted records
//!
//! Records reach us as loose JSON objects written by several generations of
//! the entry form, so each field is looked up through an ordered list of
//! binding paths. The first path holding a non-empty value wins.

use crate::model::{LineItem, Party, Record, IMAGE_SLOTS};
use crate::{ComposeError, Result};
use serde_json::Value;

/// Ordered binding paths per field
pub mod fields {
    pub const ID: &[&str] = &["$.id"];
    pub const REFERENCE_NUMBER: &[&str] = &["$.reference_number", "$.NOS"];
    pub const DATE: &[&str] = &["$.date", "$.TGL"];
    pub const PARTY1_NAME: &[&str] = &["$.party1.name", "$.PIHAK1"];
    pub const PARTY1_ID: &[&str] = &["$.party1.id_number", "$.NIP1"];
    pub const PARTY1_TITLE: &[&str] = &["$.party1.title", "$.JBT1"];
    pub const PARTY2_NAME: &[&str] = &["$.party2.name", "$.PIHAK2"];
    pub const PARTY2_ID: &[&str] = &["$.party2.id_number", "$.NIP2"];
    pub const PARTY2_TITLE: &[&str] = &["$.party2.title", "$.JBT2"];
    pub const SUBJECT: &[&str] = &["$.subject", "$.PERIHAL"];
    pub const GOODS_TYPE: &[&str] = &["$.goods_type", "$.JenBel"];
    pub const DESCRIPTION: &[&str] = &["$.description", "$.Deskripsi"];
    pub const SECTION: &[&str] = &["$.section", "$.SEKSI"];
    pub const SUPPORTING_REFERENCE: &[&str] = &["$.supporting_reference", "$.NOBAP"];
    pub const ITEMS: &[&str] = &["$.items", "$.ITEMS"];

    pub const ITEM_DESCRIPTION: &[&str] =
        &["$.description", "$.Uraian", "$.NamaBarang", "$.namaBarang"];
    pub const ITEM_QUANTITY: &[&str] = &["$.quantity", "$.Jumlah", "$.Kuantitas", "$.jumlah"];
    pub const ITEM_UNIT_PRICE: &[&str] = &[
        "$.unit_price",
        "$.Hrgsbl",
        "$.HrgItem",
        "$.hargaPerItem",
        "$.HARGA",
    ];
    pub const ITEM_UNIT_TAX: &[&str] = &["$.unit_tax", "$.PPN"];
    pub const ITEM_UNIT: &[&str] = &["$.unit", "$.Satuan", "$.satuan"];
    pub const ITEM_BRAND: &[&str] = &["$.brand", "$.Merk"];
    pub const ITEM_IMAGES: [&[&str]; 2] = [&["$.images[0]", "$.Image"], &["$.images[1]", "$.Image2"]];

    /// Single-item records written before item lists existed
    pub const LEGACY_ITEM_NAME: &[&str] = &["$.NAMABARANG"];
    pub const LEGACY_ITEM_QUANTITY: &[&str] = &["$.JUMLAH"];
    pub const LEGACY_ITEM_UNIT: &[&str] = &["$.SATUAN"];
    pub const LEGACY_ITEM_PRICE: &[&str] = &["$.HARGA"];

    /// Unit assumed for lifted legacy items
    pub const LEGACY_DEFAULT_UNIT: &str = "Pcs";
}

/// Resolve a JSONPath-like binding expression against data
///
/// Supports simple paths like:
/// - `$.field` - Root field
/// - `$.object.field` - Nested field
/// - `$.array[0]` - Array index
/// - `$.array[0].field` - Array element field
pub fn resolve_binding<'a>(path: &str, data: &'a Value) -> Option<&'a Value> {
    let path = path.strip_prefix("$.")?;
    let mut current = data;

    for segment in path.split('.') {
        if let Some(bracket_pos) = segment.find('[') {
            let field = &segment[..bracket_pos];
            let index: usize = segment[bracket_pos + 1..]
                .strip_suffix(']')?
                .parse()
                .ok()?;

            if !field.is_empty() {
                current = current.get(field)?;
            }
            current = current.get(index)?;
        } else {
            current = current.get(segment)?;
        }
    }

    Some(current)
}

/// First non-empty value along an ordered list of paths
///
/// `null` and blank strings count as missing and fall through to the next path.
pub fn resolve_first<'a>(paths: &[&str], data: &'a Value) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|path| resolve_binding(path, data))
        .find(|value| !is_blank(value))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Convert a JSON value to string for rendering
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Monetary value from a number or a locale string; anything else is zero
pub fn value_to_amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => indo_text::parse_amount(s),
        _ => 0.0,
    }
}

/// Quantity as a positive integer; missing, invalid, or non-positive input is one
pub fn value_to_quantity(value: &Value) -> u32 {
    let raw = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if raw.is_finite() && raw >= 1.0 {
        raw.trunc().min(u32::MAX as f64) as u32
    } else {
        1
    }
}

fn text_field(paths: &[&str], data: &Value) -> String {
    resolve_first(paths, data)
        .map(value_to_string)
        .unwrap_or_default()
}

fn amount_field(paths: &[&str], data: &Value) -> f64 {
    resolve_first(paths, data).map(value_to_amount).unwrap_or(0.0)
}

fn quantity_field(paths: &[&str], data: &Value) -> u32 {
    resolve_first(paths, data).map(value_to_quantity).unwrap_or(1)
}

fn image_field(paths: &[&str], data: &Value) -> Option<String> {
    resolve_first(paths, data)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Build one line item from a loose JSON object
pub fn item_from_value(data: &Value) -> LineItem {
    let mut images: [Option<String>; IMAGE_SLOTS] = [None, None];
    for (slot, paths) in images.iter_mut().zip(fields::ITEM_IMAGES) {
        *slot = image_field(paths, data);
    }

    LineItem {
        description: text_field(fields::ITEM_DESCRIPTION, data),
        quantity: quantity_field(fields::ITEM_QUANTITY, data),
        unit_price: amount_field(fields::ITEM_UNIT_PRICE, data),
        unit_tax: amount_field(fields::ITEM_UNIT_TAX, data),
        unit: text_field(fields::ITEM_UNIT, data),
        brand: text_field(fields::ITEM_BRAND, data),
        images,
    }
}

/// Lift a pre-item-list record into a single item, if it has one
fn legacy_item(data: &Value) -> Option<LineItem> {
    let name = resolve_first(fields::LEGACY_ITEM_NAME, data)?;
    let unit = resolve_first(fields::LEGACY_ITEM_UNIT, data)
        .map(value_to_string)
        .unwrap_or_else(|| fields::LEGACY_DEFAULT_UNIT.to_string());

    Some(LineItem {
        description: value_to_string(name),
        quantity: quantity_field(fields::LEGACY_ITEM_QUANTITY, data),
        unit_price: amount_field(fields::LEGACY_ITEM_PRICE, data),
        unit,
        ..LineItem::default()
    })
}

impl Record {
    /// Resolve a record from a loose JSON object
    ///
    /// Every field goes through its ordered path list in [`fields`]; missing
    /// text becomes empty, missing money becomes zero, and an unparseable
    /// date is treated as absent.
    ///
    /// # Arguments
    /// * `data` - A JSON object as persisted by any version of the entry form
    pub fn from_value(data: &Value) -> Result<Record> {
        if !data.is_object() {
            return Err(ComposeError::InvalidRecord(format!(
                "expected an object, got {}",
                type_name(data)
            )));
        }

        let date = resolve_first(fields::DATE, data)
            .and_then(Value::as_str)
            .and_then(|s| indo_text::parse_iso_date(s).ok());

        let mut items: Vec<LineItem> = resolve_first(fields::ITEMS, data)
            .and_then(Value::as_array)
            .map(|list| list.iter().map(item_from_value).collect())
            .unwrap_or_default();
        if items.is_empty() {
            items.extend(legacy_item(data));
        }

        Ok(Record {
            id: resolve_first(fields::ID, data).and_then(Value::as_u64),
            reference_number: text_field(fields::REFERENCE_NUMBER, data),
            date,
            party1: Party {
                name: text_field(fields::PARTY1_NAME, data),
                id_number: text_field(fields::PARTY1_ID, data),
                title: text_field(fields::PARTY1_TITLE, data),
            },
            party2: Party {
                name: text_field(fields::PARTY2_NAME, data),
                id_number: text_field(fields::PARTY2_ID, data),
                title: text_field(fields::PARTY2_TITLE, data),
            },
            subject: text_field(fields::SUBJECT, data),
            goods_type: text_field(fields::GOODS_TYPE, data),
            description: text_field(fields::DESCRIPTION, data),
            section: text_field(fields::SECTION, data),
            supporting_reference: text_field(fields::SUPPORTING_REFERENCE, data),
            items,
        })
    }

    /// Parse and resolve a record from a JSON string
    pub fn from_json(json: &str) -> Result<Record> {
        let value: Value = serde_json::from_str(json)?;
        Record::from_value(&value)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
