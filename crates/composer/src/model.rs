//! Record model
//!
//! A [`Record`] is one handover/receipt transaction: header fields for the two
//! signing parties and the reference numbers, plus an ordered list of
//! [`LineItem`]s. Monetary values are plain `f64` rupiah; quantities are at
//! least one.

use chrono::NaiveDate;
use serde_json::{json, Value};

/// One signatory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Party {
    pub name: String,
    /// NIP (civil-servant id number)
    pub id_number: String,
    /// Jabatan (position)
    pub title: String,
}

impl Party {
    pub fn new(
        name: impl Into<String>,
        id_number: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            id_number: id_number.into(),
            title: title.into(),
        }
    }

    /// Fill empty fields from `defaults`
    pub fn or_defaults(&self, defaults: &Party) -> Party {
        let pick = |value: &str, fallback: &str| {
            if value.trim().is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        };
        Party {
            name: pick(&self.name, &defaults.name),
            id_number: pick(&self.id_number, &defaults.id_number),
            title: pick(&self.title, &defaults.title),
        }
    }
}

/// Number of image slots per item
pub const IMAGE_SLOTS: usize = 2;

/// One line of goods or services
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    /// Free text; the first line is the item name, further lines its specification
    pub description: String,
    pub quantity: u32,
    /// Price before tax as entered on the form
    pub unit_price: f64,
    /// Tax amount per unit
    pub unit_tax: f64,
    /// Unit of measure ("Pcs", "Unit")
    pub unit: String,
    /// Merk
    pub brand: String,
    /// Data-URI images, in slot order
    pub images: [Option<String>; IMAGE_SLOTS],
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            description: String::new(),
            quantity: 1,
            unit_price: 0.0,
            unit_tax: 0.0,
            unit: String::new(),
            brand: String::new(),
            images: [None, None],
        }
    }
}

impl LineItem {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Set quantity; zero is raised to one
    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity.max(1);
        self
    }

    pub fn unit_price(mut self, price: f64) -> Self {
        self.unit_price = price;
        self
    }

    pub fn unit_tax(mut self, tax: f64) -> Self {
        self.unit_tax = tax;
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    /// Put a data URI into an image slot; out-of-range slots are ignored
    pub fn image(mut self, slot: usize, data_uri: impl Into<String>) -> Self {
        if let Some(target) = self.images.get_mut(slot) {
            *target = Some(data_uri.into());
        }
        self
    }

    /// Item name: the first non-blank line of the description
    pub fn name(&self) -> &str {
        self.description
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
    }

    /// Filled image slots in slot order
    pub fn image_uris(&self) -> impl Iterator<Item = &str> {
        self.images.iter().filter_map(|slot| slot.as_deref())
    }
}

/// One persisted transaction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// Store key; `None` until first persisted
    pub id: Option<u64>,
    /// Nomor surat
    pub reference_number: String,
    pub date: Option<NaiveDate>,
    /// Issuing party (PIHAK KESATU)
    pub party1: Party,
    /// Receiving party (PIHAK KEDUA)
    pub party2: Party,
    /// Perihal
    pub subject: String,
    /// Jenis belanja
    pub goods_type: String,
    /// Free-text description of the handed-over work
    pub description: String,
    /// Requesting sub-division (Sub Bagian)
    pub section: String,
    /// Number of the supporting minute (Berita Acara Penerimaan)
    pub supporting_reference: String,
    pub items: Vec<LineItem>,
}

impl Record {
    /// Total number of filled image slots across all items
    pub fn image_count(&self) -> usize {
        self.items.iter().map(|item| item.image_uris().count()).sum()
    }

    /// Serialize with the canonical keys read first by [`Record::from_value`]
    pub fn to_value(&self) -> Value {
        let items: Vec<Value> = self
            .items
            .iter()
            .map(|item| {
                json!({
                    "description": item.description,
                    "quantity": item.quantity,
                    "unit_price": item.unit_price,
                    "unit_tax": item.unit_tax,
                    "unit": item.unit,
                    "brand": item.brand,
                    "images": item.images,
                })
            })
            .collect();

        let party = |p: &Party| {
            json!({
                "name": p.name,
                "id_number": p.id_number,
                "title": p.title,
            })
        };

        let mut value = json!({
            "reference_number": self.reference_number,
            "date": self.date.map(|d| d.format("%Y-%m-%d").to_string()),
            "party1": party(&self.party1),
            "party2": party(&self.party2),
            "subject": self.subject,
            "goods_type": self.goods_type,
            "description": self.description,
            "section": self.section,
            "supporting_reference": self.supporting_reference,
            "items": items,
        });
        if let (Some(id), Some(map)) = (self.id, value.as_object_mut()) {
            map.insert("id".to_string(), json!(id));
        }
        value
    }
}
