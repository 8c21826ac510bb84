//! Entry form state
//!
//! The form is a value: every user action is a [`FormEvent`] folded into a
//! new [`FormState`] by [`FormState::reduce`]. Inputs are kept as typed, so a
//! half-entered price stays visible until the record is saved; conversion and
//! validation happen in [`FormState::to_record`].

use crate::validation::{validate_record, ValidationError, ValidationErrors};
use composer::{LineItem, Party, Record, IMAGE_SLOTS};
use indo_text::{format_amount, parse_amount, parse_iso_date};
use log::debug;

/// Header inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    ReferenceNumber,
    /// ISO date, `YYYY-MM-DD`
    Date,
    Party1Name,
    Party1Id,
    Party1Title,
    Party2Name,
    Party2Id,
    Party2Title,
    Subject,
    GoodsType,
    Description,
    Section,
    SupportingReference,
}

/// Per-item inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Description,
    Quantity,
    UnitPrice,
    UnitTax,
    Unit,
    Brand,
}

/// One item row as typed
#[derive(Debug, Clone, PartialEq)]
pub struct FormItem {
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    pub unit_tax: String,
    pub unit: String,
    pub brand: String,
    pub images: [Option<String>; IMAGE_SLOTS],
}

impl Default for FormItem {
    fn default() -> Self {
        Self {
            description: String::new(),
            quantity: "1".to_string(),
            unit_price: String::new(),
            unit_tax: String::new(),
            unit: String::new(),
            brand: String::new(),
            images: [None, None],
        }
    }
}

/// Amount as typed into the form; the `,dd` fraction is always present
fn amount_input(value: f64) -> String {
    let mut text = format_amount(value, 2);
    if !text.contains(',') {
        text.push_str(",00");
    }
    text
}

impl FormItem {
    fn from_item(item: &LineItem) -> Self {
        Self {
            description: item.description.clone(),
            quantity: item.quantity.to_string(),
            unit_price: amount_input(item.unit_price),
            unit_tax: amount_input(item.unit_tax),
            unit: item.unit.clone(),
            brand: item.brand.clone(),
            images: item.images.clone(),
        }
    }

    /// Quantity for live totals; anything unusable counts as one
    fn live_quantity(&self) -> f64 {
        match self.quantity.trim().parse::<u32>() {
            Ok(q) if q >= 1 => q as f64,
            _ => 1.0,
        }
    }

    /// `(price + tax) × quantity`, rounded to whole rupiah
    pub fn subtotal(&self) -> i64 {
        let price = parse_amount(&self.unit_price);
        let tax = parse_amount(&self.unit_tax);
        ((price + tax) * self.live_quantity()).round() as i64
    }
}

/// A user action on the form
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    SetField(HeaderField, String),
    SetItemField(usize, ItemField, String),
    /// Set or clear one image slot of one item
    SetImage {
        item: usize,
        slot: usize,
        data_uri: Option<String>,
    },
    AddItem,
    /// Removing the last remaining item is ignored
    RemoveItem(usize),
    /// Open an existing record for editing
    Load(Record),
    Reset,
}

/// The entry form
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    /// Set while editing a stored record
    pub id: Option<u64>,
    pub reference_number: String,
    pub date: String,
    pub party1: Party,
    pub party2: Party,
    pub subject: String,
    pub goods_type: String,
    pub description: String,
    pub section: String,
    pub supporting_reference: String,
    pub items: Vec<FormItem>,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    /// Empty form with one item row
    pub fn new() -> Self {
        Self {
            id: None,
            reference_number: String::new(),
            date: String::new(),
            party1: Party::default(),
            party2: Party::default(),
            subject: String::new(),
            goods_type: String::new(),
            description: String::new(),
            section: String::new(),
            supporting_reference: String::new(),
            items: vec![FormItem::default()],
        }
    }

    /// Form prefilled from a stored record
    pub fn from_record(record: &Record) -> Self {
        let mut items: Vec<FormItem> = record.items.iter().map(FormItem::from_item).collect();
        if items.is_empty() {
            items.push(FormItem::default());
        }
        Self {
            id: record.id,
            reference_number: record.reference_number.clone(),
            date: record
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            party1: record.party1.clone(),
            party2: record.party2.clone(),
            subject: record.subject.clone(),
            goods_type: record.goods_type.clone(),
            description: record.description.clone(),
            section: record.section.clone(),
            supporting_reference: record.supporting_reference.clone(),
            items,
        }
    }

    /// Apply one event
    pub fn reduce(mut self, event: FormEvent) -> Self {
        match event {
            FormEvent::SetField(field, value) => *self.header_mut(field) = value,
            FormEvent::SetItemField(index, field, value) => {
                if let Some(item) = self.items.get_mut(index) {
                    let target = match field {
                        ItemField::Description => &mut item.description,
                        ItemField::Quantity => &mut item.quantity,
                        ItemField::UnitPrice => &mut item.unit_price,
                        ItemField::UnitTax => &mut item.unit_tax,
                        ItemField::Unit => &mut item.unit,
                        ItemField::Brand => &mut item.brand,
                    };
                    *target = value;
                }
            }
            FormEvent::SetImage {
                item,
                slot,
                data_uri,
            } => {
                if let Some(target) = self
                    .items
                    .get_mut(item)
                    .and_then(|i| i.images.get_mut(slot))
                {
                    *target = data_uri;
                }
            }
            FormEvent::AddItem => self.items.push(FormItem::default()),
            FormEvent::RemoveItem(index) => {
                if self.items.len() <= 1 {
                    debug!("refusing to remove the last item row");
                } else if index < self.items.len() {
                    self.items.remove(index);
                }
            }
            FormEvent::Load(record) => return Self::from_record(&record),
            FormEvent::Reset => return Self::new(),
        }
        self
    }

    fn header_mut(&mut self, field: HeaderField) -> &mut String {
        match field {
            HeaderField::ReferenceNumber => &mut self.reference_number,
            HeaderField::Date => &mut self.date,
            HeaderField::Party1Name => &mut self.party1.name,
            HeaderField::Party1Id => &mut self.party1.id_number,
            HeaderField::Party1Title => &mut self.party1.title,
            HeaderField::Party2Name => &mut self.party2.name,
            HeaderField::Party2Id => &mut self.party2.id_number,
            HeaderField::Party2Title => &mut self.party2.title,
            HeaderField::Subject => &mut self.subject,
            HeaderField::GoodsType => &mut self.goods_type,
            HeaderField::Description => &mut self.description,
            HeaderField::Section => &mut self.section,
            HeaderField::SupportingReference => &mut self.supporting_reference,
        }
    }

    /// Live subtotal of each item row
    pub fn subtotals(&self) -> Vec<i64> {
        self.items.iter().map(FormItem::subtotal).collect()
    }

    /// Sum of the live subtotals
    pub fn grand_total(&self) -> i64 {
        self.subtotals().iter().sum()
    }

    /// Convert to a record, reporting every invalid input
    pub fn to_record(&self) -> Result<Record, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let date = match self.date.trim() {
            "" => None,
            text => match parse_iso_date(text) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add(ValidationError::invalid_date("date", text));
                    None
                }
            },
        };

        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let quantity = match item.quantity.trim().parse::<u32>() {
                    Ok(q) if q >= 1 => q,
                    _ => {
                        errors.add(ValidationError::invalid_quantity(
                            &format!("items[{}].quantity", index),
                            item.quantity.trim(),
                        ));
                        1
                    }
                };
                LineItem {
                    description: item.description.trim().to_string(),
                    quantity,
                    unit_price: parse_amount(&item.unit_price),
                    unit_tax: parse_amount(&item.unit_tax),
                    unit: item.unit.trim().to_string(),
                    brand: item.brand.trim().to_string(),
                    images: item.images.clone(),
                }
            })
            .collect();

        let trimmed = |p: &Party| Party::new(p.name.trim(), p.id_number.trim(), p.title.trim());
        let record = Record {
            id: self.id,
            reference_number: self.reference_number.trim().to_string(),
            date,
            party1: trimmed(&self.party1),
            party2: trimmed(&self.party2),
            subject: self.subject.trim().to_string(),
            goods_type: self.goods_type.trim().to_string(),
            description: self.description.trim().to_string(),
            section: self.section.trim().to_string(),
            supporting_reference: self.supporting_reference.trim().to_string(),
            items,
        };

        if let Err(more) = validate_record(&record) {
            for error in more.iter() {
                errors.add(error.clone());
            }
        }
        errors.into_result().map(|()| record)
    }
}
