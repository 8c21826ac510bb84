//! Monetary totals
//!
//! Two price conventions exist in the documents this crate produces:
//!
//! - [`PriceConvention::AsEntered`]: the entered price is already the line's
//!   pre-tax amount and is summed as is, while tax is entered per unit. The
//!   line's post-tax amount is `price + tax × quantity`, yet the displayed
//!   tax total sums the per-unit tax without multiplying.
//! - [`PriceConvention::PerUnit`]: the entered price is per unit, so every
//!   line amount is multiplied by the quantity.
//!
//! A variant picks one convention and every figure in its document uses it.

use crate::model::LineItem;
use serde::{Deserialize, Serialize};

/// How entered prices relate to quantities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceConvention {
    #[default]
    AsEntered,
    PerUnit,
}

/// Figures for one line item
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineTotals {
    pub quantity: u32,
    /// Entered price per unit
    pub unit_price: f64,
    pub pre_tax: f64,
    /// Tax column value
    pub tax: f64,
    pub post_tax: f64,
}

impl LineTotals {
    pub fn compute(item: &LineItem, convention: PriceConvention) -> Self {
        let quantity = item.quantity.max(1);
        let qty = quantity as f64;
        let price = sanitize(item.unit_price);
        let tax = sanitize(item.unit_tax);

        match convention {
            PriceConvention::AsEntered => Self {
                quantity,
                unit_price: price,
                pre_tax: price,
                tax,
                post_tax: price + tax * qty,
            },
            PriceConvention::PerUnit => Self {
                quantity,
                unit_price: price,
                pre_tax: price * qty,
                tax: tax * qty,
                post_tax: (price + tax) * qty,
            },
        }
    }
}

/// Aggregate figures for a whole record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
    pub convention: PriceConvention,
    /// Per item, in item order
    pub lines: Vec<LineTotals>,
    pub pre_tax: f64,
    pub tax: f64,
    pub post_tax: f64,
    /// Post-tax total rounded to whole rupiah
    pub grand_total: i64,
    /// Grand total spelled out, e.g. "Seribu Tujuh Ratus Rupiah"
    pub in_words: String,
}

impl Totals {
    /// Compute totals for a list of items
    ///
    /// # Arguments
    /// * `items` - Line items in document order
    /// * `convention` - The variant's price convention
    pub fn compute(items: &[LineItem], convention: PriceConvention) -> Self {
        let lines: Vec<LineTotals> = items
            .iter()
            .map(|item| LineTotals::compute(item, convention))
            .collect();

        let pre_tax = lines.iter().map(|l| l.pre_tax).sum();
        let tax = lines.iter().map(|l| l.tax).sum();
        let post_tax: f64 = lines.iter().map(|l| l.post_tax).sum();
        let grand_total = post_tax.round() as i64;

        Self {
            convention,
            lines,
            pre_tax,
            tax,
            post_tax,
            grand_total,
            in_words: indo_text::rupiah_words(grand_total as f64),
        }
    }
}

/// Missing or invalid money counts as zero
fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
