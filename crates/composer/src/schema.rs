//! Composed document schema
//!
//! The composer produces a [`Document`]: an ordered list of semantic blocks
//! (letterhead, title, key/value tables, the item table, signatures and the
//! image appendix). The renderer lowers it to a backend-neutral
//! [`doc_core::DocTree`].

use serde::{Deserialize, Serialize};

/// RGB color from a hex string ("E0E0E0")
pub(crate) fn hex_color(hex: &str) -> Option<doc_core::Color> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(doc_core::Color::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Horizontal alignment as written in variant files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl From<TextAlign> for doc_core::Align {
    fn from(align: TextAlign) -> Self {
        match align {
            TextAlign::Left => doc_core::Align::Left,
            TextAlign::Center => doc_core::Align::Center,
            TextAlign::Right => doc_core::Align::Right,
            TextAlign::Justify => doc_core::Align::Justify,
        }
    }
}

/// Styled piece of text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Font size in points; `None` uses the page default
    pub size: Option<f32>,
    /// Hex color ("333333"); `None` is black
    pub color: Option<String>,
}

impl Span {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn color(mut self, hex: impl Into<String>) -> Self {
        self.color = Some(hex.into());
        self
    }

    /// Same style, different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }
}

/// A composed document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// The image appendix, if the record carried any image
    pub fn appendix(&self) -> Option<&ImageAppendix> {
        self.blocks.iter().find_map(|block| match block {
            Block::ImageAppendix(appendix) => Some(appendix),
            _ => None,
        })
    }

    /// All item tables in order
    pub fn item_tables(&self) -> impl Iterator<Item = &ItemTable> {
        self.blocks.iter().filter_map(|block| match block {
            Block::ItemTable(table) => Some(table),
            _ => None,
        })
    }
}

/// Top-level block
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Letterhead(Letterhead),
    Title(TitleBlock),
    Text(TextBlock),
    KeyValueTable(KeyValueTable),
    ItemTable(ItemTable),
    SignatureBlock(SignatureBlock),
    PageBreak,
    ImageAppendix(ImageAppendix),
}

/// What sits in the logo slot of a letterhead
#[derive(Debug, Clone, PartialEq)]
pub enum LogoSlot {
    Image(Vec<u8>),
    /// Shown when the logo could not be fetched
    Placeholder(String),
}

/// Institutional header
#[derive(Debug, Clone, PartialEq)]
pub struct Letterhead {
    pub logo: Option<LogoSlot>,
    pub lines: Vec<Span>,
    /// Draw a rule under the header
    pub rule: bool,
}

/// Centered title with optional reference-number line
#[derive(Debug, Clone, PartialEq)]
pub struct TitleBlock {
    pub title: Span,
    pub reference: Option<Span>,
}

/// Free paragraph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBlock {
    pub spans: Vec<Span>,
    pub align: TextAlign,
    pub spacing_after: f64,
    pub indent: f64,
}

impl TextBlock {
    pub fn new(spans: Vec<Span>) -> Self {
        Self {
            spans,
            ..Self::default()
        }
    }

    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// One "label : value" line
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueRow {
    /// Enumeration mark ("I.") for numbered party blocks
    pub marker: Option<String>,
    pub label: String,
    pub value: Span,
}

/// Borderless label/colon/value table
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueTable {
    pub rows: Vec<KeyValueRow>,
    /// Column widths in percent, marker column first when numbered
    pub widths: Vec<f64>,
    /// Closing line spanning the label and value columns
    pub footer: Option<Vec<Span>>,
}

impl KeyValueTable {
    pub fn is_numbered(&self) -> bool {
        self.rows.iter().any(|row| row.marker.is_some())
    }

    /// Value text of the first row with the given label
    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.text.as_str())
    }
}

/// One item table cell: each span is its own line
#[derive(Debug, Clone, PartialEq)]
pub struct ItemCell {
    pub lines: Vec<Span>,
    pub align: TextAlign,
}

impl ItemCell {
    pub fn new(text: impl Into<String>, align: TextAlign) -> Self {
        Self {
            lines: vec![Span::new(text)],
            align,
        }
    }

    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Closing row of a monetary item table
#[derive(Debug, Clone, PartialEq)]
pub struct TotalRow {
    /// Spans every column but the last
    pub label: String,
    pub label_align: TextAlign,
    pub amount: String,
}

/// Bordered item table
#[derive(Debug, Clone, PartialEq)]
pub struct ItemTable {
    pub widths: Vec<f64>,
    pub header: Vec<String>,
    /// Header background as hex
    pub header_shading: Option<String>,
    pub rows: Vec<Vec<ItemCell>>,
    pub total: Option<TotalRow>,
    /// Body font size
    pub size: Option<f32>,
}

/// One signature column, top to bottom
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureColumn {
    /// Place/date, caption, role, and title lines
    pub above: Vec<Span>,
    pub name: Span,
    /// Id-number line
    pub below: Vec<Span>,
}

/// Two signature columns side by side
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureBlock {
    pub left: SignatureColumn,
    pub right: SignatureColumn,
    /// Blank space reserved for the handwritten signature, in points
    pub gap: f64,
}

/// One appendix entry
#[derive(Debug, Clone, PartialEq)]
pub enum AppendixEntry {
    Image {
        label: String,
        data: Vec<u8>,
        width: f64,
        height: f64,
    },
    /// The slot held something that is not an image data URI
    Placeholder { label: String, message: String },
}

impl AppendixEntry {
    pub fn label(&self) -> &str {
        match self {
            AppendixEntry::Image { label, .. } | AppendixEntry::Placeholder { label, .. } => label,
        }
    }
}

/// Documentation pages with one entry per filled image slot
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAppendix {
    pub heading: String,
    pub entries: Vec<AppendixEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color("E0E0E0"), Some(doc_core::Color::light_gray()));
        assert_eq!(hex_color("#000000"), Some(doc_core::Color::black()));
        assert_eq!(hex_color("xyz"), None);
        assert_eq!(hex_color("GG0000"), None);
    }

    #[test]
    fn test_span_deserialize_defaults() {
        let span: Span = serde_json::from_str(r#"{"text": "DINAS SOSIAL", "bold": true}"#).unwrap();
        assert_eq!(span, Span::new("DINAS SOSIAL").bold());
    }

    #[test]
    fn test_document_appendix_lookup() {
        let mut doc = Document::default();
        assert!(doc.appendix().is_none());
        doc.push(Block::PageBreak);
        doc.push(Block::ImageAppendix(ImageAppendix {
            heading: "Dokumentasi".to_string(),
            entries: vec![],
        }));
        assert_eq!(doc.appendix().map(|a| a.heading.as_str()), Some("Dokumentasi"));
    }

    #[test]
    fn test_key_value_lookup() {
        let table = KeyValueTable {
            rows: vec![KeyValueRow {
                marker: None,
                label: "Nama".to_string(),
                value: Span::new("Budi"),
            }],
            widths: vec![25.0, 5.0, 70.0],
            footer: None,
        };
        assert!(!table.is_numbered());
        assert_eq!(table.value_of("Nama"), Some("Budi"));
        assert_eq!(table.value_of("NIP"), None);
    }
}
