//! Document variant configuration
//!
//! A variant is data, not code: an ordered list of [`Section`]s plus the
//! naming, price-convention, party-default and appendix settings that set
//! one document type apart from another. Text fields are templates whose
//! `{placeholder}`s are bound to the record at composition time:
//!
//! | Placeholder | Value |
//! |-------------|-------|
//! | `{reference_number}` | Nomor surat |
//! | `{date}` | Document date, `"05 Januari 2025"` |
//! | `{place}` | The variant's place name |
//! | `{subject}`, `{goods_type}`, `{description}`, `{section}`, `{supporting_reference}` | Record header fields |
//! | `{party1.name}`, `{party1.id_number}`, `{party1.title}` (and `party2`) | Parties, defaults applied |
//!
//! A placeholder may carry a case filter: `{section|acronyms}`,
//! `{party1.name|title}`, `{reference_number|upper}`.

use crate::model::Party;
use crate::schema::{Span, TextAlign};
use crate::totals::PriceConvention;
use crate::{ComposeError, Result};
use serde::{Deserialize, Serialize};

/// Built-in variants as (key, JSON)
const PRESETS: [(&str, &str); 5] = [
    ("bast", include_str!("../data/variants/bast.json")),
    ("tanda-terima", include_str!("../data/variants/tanda-terima.json")),
    ("serah-terima", include_str!("../data/variants/serah-terima.json")),
    (
        "penyerahan-barang",
        include_str!("../data/variants/penyerahan-barang.json"),
    ),
    ("nota-dinas", include_str!("../data/variants/nota-dinas.json")),
];

/// Casing applied to a bound value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextCase {
    #[default]
    AsIs,
    /// Every word capitalized
    Title,
    /// Title case keeping the variant's acronyms upper case
    Acronyms,
    Upper,
}

impl TextCase {
    pub fn apply(self, s: &str, acronyms: &[String]) -> String {
        match self {
            TextCase::AsIs => s.to_string(),
            TextCase::Title => indo_text::title_case(s),
            TextCase::Acronyms => {
                let list: Vec<&str> = acronyms.iter().map(String::as_str).collect();
                indo_text::title_case_with_acronyms(s, &list)
            }
            TextCase::Upper => s.to_uppercase(),
        }
    }

    /// Parse a template filter name
    pub fn from_filter(name: &str) -> Option<Self> {
        match name.trim() {
            "title" => Some(TextCase::Title),
            "acronyms" => Some(TextCase::Acronyms),
            "upper" => Some(TextCase::Upper),
            "" | "as-is" => Some(TextCase::AsIs),
            _ => None,
        }
    }
}

/// Which signatory a section refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartyRef {
    First,
    Second,
}

/// Values used when a record leaves a party field empty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyDefaults {
    pub name: String,
    pub id_number: String,
    pub title: String,
}

impl PartyDefaults {
    pub fn to_party(&self) -> Party {
        Party::new(&self.name, &self.id_number, &self.title)
    }
}

/// Bold/italic switches for one piece of a sentence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Emphasis {
    pub bold: bool,
    pub italic: bool,
}

impl Emphasis {
    pub fn style(self, mut span: Span) -> Span {
        span.bold = self.bold;
        span.italic = self.italic;
        span
    }
}

/// Institutional header lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterheadSection {
    /// Reserve a logo cell left of the lines
    pub logo: bool,
    pub lines: Vec<Span>,
    pub rule: bool,
}

/// Document title and reference line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleSection {
    pub title: Span,
    #[serde(default)]
    pub reference: Option<Span>,
}

/// Paragraph of templated spans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSection {
    pub spans: Vec<Span>,
    pub align: TextAlign,
    pub spacing_after: f64,
    pub indent: f64,
}

/// "Pada hari ini <weekday> tanggal <day> bulan <month> tahun <year>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateSentenceSection {
    pub prefix: String,
    pub day_joiner: String,
    pub month_joiner: String,
    pub year_joiner: String,
    pub suffix: String,
    pub weekday: Emphasis,
    pub day: Emphasis,
    pub month: Emphasis,
    pub year: Emphasis,
    pub align: TextAlign,
}

impl Default for DateSentenceSection {
    fn default() -> Self {
        Self {
            prefix: "Pada hari ini ".to_string(),
            day_joiner: " tanggal ".to_string(),
            month_joiner: " bulan ".to_string(),
            year_joiner: " tahun ".to_string(),
            suffix: String::new(),
            weekday: Emphasis::default(),
            day: Emphasis::default(),
            month: Emphasis::default(),
            year: Emphasis::default(),
            align: TextAlign::Justify,
        }
    }
}

/// One templated key/value line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValueSpec {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub bold: bool,
}

fn default_key_value_widths() -> Vec<f64> {
    vec![25.0, 5.0, 70.0]
}

/// Free key/value table (memo headers, attachment headers)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValueSection {
    #[serde(default)]
    pub heading: Option<Span>,
    pub rows: Vec<KeyValueSpec>,
    #[serde(default = "default_key_value_widths")]
    pub widths: Vec<f64>,
}

/// "hereinafter referred to as ..." sentence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Designation {
    pub prefix: String,
    pub label: String,
    pub label_bold: bool,
    pub italic: bool,
}

/// Name / NIP / Jabatan block for one party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartySection {
    pub party: PartyRef,
    #[serde(default)]
    pub heading: Option<Span>,
    /// Enumeration mark ("I."); numbered blocks keep the designation inside the table
    #[serde(default)]
    pub numeral: Option<String>,
    #[serde(default)]
    pub name_case: TextCase,
    #[serde(default)]
    pub title_case: TextCase,
    #[serde(default)]
    pub name_bold: bool,
    #[serde(default)]
    pub designation: Option<Designation>,
}

/// Numbered list of templated statements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementsSection {
    pub items: Vec<String>,
    pub align: TextAlign,
}

/// What an item table column shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnKind {
    /// "1"
    Number,
    /// "1."
    NumberDotted,
    Quantity,
    /// "2 Pcs"
    QuantityWithUnit,
    /// Whole description on one cell line
    Description,
    /// First description line bold, further lines plain
    DescriptionLines,
    Unit,
    Brand,
    UnitPrice,
    PreTax,
    Tax,
    PostTax,
}

impl ColumnKind {
    pub fn is_monetary(self) -> bool {
        matches!(
            self,
            ColumnKind::UnitPrice | ColumnKind::PreTax | ColumnKind::Tax | ColumnKind::PostTax
        )
    }

    pub fn default_align(self) -> TextAlign {
        match self {
            ColumnKind::Description
            | ColumnKind::DescriptionLines
            | ColumnKind::Brand => TextAlign::Left,
            kind if kind.is_monetary() => TextAlign::Right,
            _ => TextAlign::Center,
        }
    }
}

/// One item table column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub kind: ColumnKind,
    pub header: String,
    /// Percent of the table width
    pub width: f64,
    #[serde(default)]
    pub case: TextCase,
    #[serde(default)]
    pub align: Option<TextAlign>,
}

/// Closing row of the item table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TotalsRow {
    #[default]
    None,
    /// "<prefix><Words> Rupiah" and the post-tax total
    InWords { prefix: String },
    /// A label and the post-tax total
    Sum { label: String },
}

/// The itemized table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTableSection {
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub header_shading: Option<String>,
    #[serde(default)]
    pub size: Option<f32>,
    #[serde(default)]
    pub totals: TotalsRow,
}

fn default_id_prefix() -> String {
    "NIP. ".to_string()
}

/// One signature column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureSide {
    pub party: PartyRef,
    /// Print "<place>, <date>" on top
    #[serde(default)]
    pub place_date: bool,
    /// "Mengetahui,"
    #[serde(default)]
    pub caption: Option<String>,
    /// Bold role line ("PIHAK KEDUA")
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub show_title: bool,
    #[serde(default)]
    pub title_case: TextCase,
    #[serde(default)]
    pub name_case: TextCase,
    #[serde(default)]
    pub name_bold: bool,
    #[serde(default)]
    pub name_underline: bool,
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
}

fn default_signature_gap() -> f64 {
    60.0
}

/// Two signature columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureSection {
    pub left: SignatureSide,
    pub right: SignatureSide,
    #[serde(default = "default_signature_gap")]
    pub gap: f64,
}

/// Documentation appendix settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppendixConfig {
    pub heading: String,
    /// Label template: `{n}` running image number, `{item}` item number,
    /// `{description}` item name
    pub label: String,
    /// Image box in points
    pub width: f64,
    pub height: f64,
}

impl Default for AppendixConfig {
    fn default() -> Self {
        Self {
            heading: "Dokumentasi".to_string(),
            label: "Gambar {n}".to_string(),
            width: 450.0,
            height: 350.0,
        }
    }
}

/// One piece of a variant's layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Section {
    Letterhead(LetterheadSection),
    Title(TitleSection),
    Text(TextSection),
    DateSentence(DateSentenceSection),
    KeyValue(KeyValueSection),
    Party(PartySection),
    Statements(StatementsSection),
    ItemTable(ItemTableSection),
    Signature(SignatureSection),
    PageBreak,
}

fn default_place() -> String {
    "Tuban".to_string()
}

fn default_acronyms() -> Vec<String> {
    indo_text::DEFAULT_ACRONYMS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// A complete document variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub key: String,
    #[serde(default)]
    pub name: String,
    /// File name template, without extension
    pub file_name: String,
    #[serde(default)]
    pub price_convention: PriceConvention,
    #[serde(default = "default_place")]
    pub place: String,
    #[serde(default)]
    pub party1: PartyDefaults,
    #[serde(default)]
    pub party2: PartyDefaults,
    #[serde(default = "default_acronyms")]
    pub acronyms: Vec<String>,
    /// Unit shown when an item has none
    #[serde(default)]
    pub default_unit: String,
    pub sections: Vec<Section>,
    #[serde(default)]
    pub appendix: AppendixConfig,
}

impl VariantConfig {
    /// Parse and check a variant from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let variant: VariantConfig =
            serde_json::from_str(json).map_err(|e| ComposeError::InvalidVariant(e.to_string()))?;
        variant.validate()?;
        Ok(variant)
    }

    /// Load a built-in variant by key
    ///
    /// # Arguments
    /// * `key` - One of [`VariantConfig::preset_keys`]
    pub fn preset(key: &str) -> Result<Self> {
        let (_, json) = PRESETS
            .iter()
            .find(|(name, _)| *name == key)
            .ok_or_else(|| ComposeError::UnknownVariant(key.to_string()))?;
        Self::from_json(json)
    }

    /// Keys of the built-in variants
    pub fn preset_keys() -> impl Iterator<Item = &'static str> {
        PRESETS.iter().map(|(key, _)| *key)
    }

    /// Whether any item table shows money
    pub fn is_monetary(&self) -> bool {
        self.sections.iter().any(|section| match section {
            Section::ItemTable(table) => {
                table.columns.iter().any(|c| c.kind.is_monetary())
                    || table.totals != TotalsRow::None
            }
            _ => false,
        })
    }

    fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ComposeError::InvalidVariant(msg));

        if self.key.trim().is_empty() {
            return invalid("variant key is empty".to_string());
        }
        if self.file_name.trim().is_empty() {
            return invalid(format!("variant '{}' has no file name", self.key));
        }
        if self.sections.is_empty() {
            return invalid(format!("variant '{}' has no sections", self.key));
        }
        if self.appendix.width <= 0.0 || self.appendix.height <= 0.0 {
            return invalid(format!("variant '{}' has an empty image box", self.key));
        }

        for section in &self.sections {
            match section {
                Section::ItemTable(table) => {
                    if table.columns.is_empty() {
                        return invalid(format!("variant '{}' has an item table without columns", self.key));
                    }
                    if let Some(column) = table.columns.iter().find(|c| c.width <= 0.0) {
                        return invalid(format!(
                            "column '{}' of variant '{}' has no width",
                            column.header, self.key
                        ));
                    }
                    if table.totals != TotalsRow::None && table.columns.len() < 2 {
                        return invalid(format!(
                            "variant '{}' needs two columns for a totals row",
                            self.key
                        ));
                    }
                }
                Section::KeyValue(kv) if kv.widths.len() != 3 => {
                    return invalid(format!(
                        "key/value table of variant '{}' needs three widths",
                        self.key
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_presets_load() {
        for key in VariantConfig::preset_keys() {
            let variant = VariantConfig::preset(key).unwrap();
            assert_eq!(variant.key, key);
            assert!(!variant.sections.is_empty());
        }
    }

    #[test]
    fn test_unknown_preset() {
        let err = VariantConfig::preset("kwitansi").unwrap_err();
        assert_eq!(err.to_string(), "Unknown variant: kwitansi");
    }

    #[test]
    fn test_monetary_presets() {
        let monetary: Vec<bool> = VariantConfig::preset_keys()
            .map(|key| VariantConfig::preset(key).unwrap().is_monetary())
            .collect();
        assert_eq!(monetary, vec![true, false, false, false, true]);
    }

    #[test]
    fn test_price_conventions() {
        assert_eq!(
            VariantConfig::preset("bast").unwrap().price_convention,
            PriceConvention::AsEntered
        );
        assert_eq!(
            VariantConfig::preset("nota-dinas").unwrap().price_convention,
            PriceConvention::PerUnit
        );
    }

    #[test]
    fn test_minimal_custom_variant() {
        let json = r#"{
            "key": "kwitansi",
            "file_name": "KWITANSI_{reference_number}",
            "sections": [
                { "type": "title", "title": { "text": "KWITANSI", "bold": true } },
                { "type": "page-break" },
                {
                    "type": "item-table",
                    "columns": [
                        { "kind": "number", "header": "No", "width": 10 },
                        { "kind": "post-tax", "header": "Jumlah", "width": 90 }
                    ],
                    "totals": { "kind": "sum", "label": "Total" }
                }
            ]
        }"#;

        let variant = VariantConfig::from_json(json).unwrap();
        assert_eq!(variant.place, "Tuban");
        assert_eq!(variant.acronyms, vec!["UPT", "RSBG", "NIP"]);
        assert_eq!(variant.appendix, AppendixConfig::default());
        assert_eq!(variant.sections.len(), 3);
        assert!(variant.is_monetary());
    }

    #[test]
    fn test_invalid_variants() {
        let no_sections = r#"{ "key": "x", "file_name": "x", "sections": [] }"#;
        assert!(matches!(
            VariantConfig::from_json(no_sections),
            Err(ComposeError::InvalidVariant(_))
        ));

        let zero_width = r#"{
            "key": "x", "file_name": "x",
            "sections": [{ "type": "item-table", "columns": [{ "kind": "number", "header": "No", "width": 0 }] }]
        }"#;
        let err = VariantConfig::from_json(zero_width).unwrap_err();
        assert_eq!(err.to_string(), "Invalid variant: column 'No' of variant 'x' has no width");

        let unknown_section = r#"{ "key": "x", "file_name": "x", "sections": [{ "type": "chart" }] }"#;
        assert!(VariantConfig::from_json(unknown_section).is_err());
    }

    #[test]
    fn test_text_case() {
        let acronyms = default_acronyms();
        assert_eq!(TextCase::Title.apply("budi santoso", &acronyms), "Budi Santoso");
        assert_eq!(
            TextCase::Acronyms.apply("pengurus barang upt rsbg tuban", &acronyms),
            "Pengurus Barang UPT RSBG Tuban"
        );
        assert_eq!(TextCase::Upper.apply("Nomor", &acronyms), "NOMOR");
        assert_eq!(TextCase::AsIs.apply("aBc", &acronyms), "aBc");
        assert_eq!(TextCase::from_filter("title"), Some(TextCase::Title));
        assert_eq!(TextCase::from_filter("shout"), None);
    }

    #[test]
    fn test_column_defaults() {
        assert_eq!(ColumnKind::PostTax.default_align(), TextAlign::Right);
        assert_eq!(ColumnKind::DescriptionLines.default_align(), TextAlign::Left);
        assert_eq!(ColumnKind::NumberDotted.default_align(), TextAlign::Center);
        assert!(!ColumnKind::Quantity.is_monetary());
    }
}
