//! Document composition
//!
//! [`Composer`] walks a variant's sections in order and turns one record and
//! its totals into a [`Document`]. Composition never fails: missing values
//! render as `-` or the variant's defaults, an unavailable logo becomes a
//! text placeholder, and an image slot that is not an image data URI becomes
//! a labeled placeholder in the appendix.

use crate::model::{LineItem, Party, Record};
use crate::schema::*;
use crate::totals::{LineTotals, Totals};
use crate::variant::{
    ColumnSpec, ColumnKind, DateSentenceSection, Designation, KeyValueSection, PartyRef,
    PartySection, Section, SignatureSection, SignatureSide, TextCase, TotalsRow, VariantConfig,
};
use crate::{sanitize_file_name, ComposeError, Result};
use chrono::NaiveDate;
use indo_text::{format_date_long, format_rupiah, DateNarration};
use log::{debug, warn};

/// Text shown in the logo cell when no logo could be loaded
pub const LOGO_PLACEHOLDER: &str = "LOGO";

/// Rendered for missing optional values
const MISSING: &str = "-";

/// Widths of a numbered party table: marker, label, colon, value
const NUMBERED_PARTY_WIDTHS: [f64; 4] = [5.0, 20.0, 5.0, 70.0];
const PARTY_WIDTHS: [f64; 3] = [25.0, 5.0, 70.0];

/// Supplies the letterhead logo
pub trait LogoSource {
    /// Fetch the logo image bytes (JPEG or PNG)
    fn load_logo(&self) -> Result<Vec<u8>>;
}

/// A logo already held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticLogo(pub Vec<u8>);

impl LogoSource for StaticLogo {
    fn load_logo(&self) -> Result<Vec<u8>> {
        if self.0.is_empty() {
            return Err(ComposeError::LogoUnavailable("no logo bytes".to_string()));
        }
        Ok(self.0.clone())
    }
}

impl<F> LogoSource for F
where
    F: Fn() -> Result<Vec<u8>>,
{
    fn load_logo(&self) -> Result<Vec<u8>> {
        self()
    }
}

/// Inputs that are not part of the record
#[derive(Clone, Copy)]
pub struct ComposeContext<'a> {
    /// Used when the record has no date
    pub today: NaiveDate,
    pub logo: Option<&'a dyn LogoSource>,
}

impl<'a> ComposeContext<'a> {
    pub fn new(today: NaiveDate) -> Self {
        Self { today, logo: None }
    }

    pub fn with_logo(mut self, logo: &'a dyn LogoSource) -> Self {
        self.logo = Some(logo);
        self
    }
}

/// Record values bound to template placeholders
struct Bindings<'a> {
    record: &'a Record,
    parties: [Party; 2],
    date: NaiveDate,
    place: &'a str,
    acronyms: &'a [String],
}

impl<'a> Bindings<'a> {
    fn new(record: &'a Record, variant: &'a VariantConfig, today: NaiveDate) -> Self {
        Self {
            record,
            parties: [
                record.party1.or_defaults(&variant.party1.to_party()),
                record.party2.or_defaults(&variant.party2.to_party()),
            ],
            date: record.date.unwrap_or(today),
            place: &variant.place,
            acronyms: &variant.acronyms,
        }
    }

    fn party(&self, party: PartyRef) -> &Party {
        match party {
            PartyRef::First => &self.parties[0],
            PartyRef::Second => &self.parties[1],
        }
    }

    fn case(&self, case: TextCase, value: &str) -> String {
        or_missing(&case.apply(value.trim(), self.acronyms))
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let record = self.record;
        let value = match key {
            "reference_number" => record.reference_number.clone(),
            "date" => format_date_long(self.date),
            "place" => self.place.to_string(),
            "subject" => record.subject.clone(),
            "goods_type" => record.goods_type.clone(),
            "description" => record.description.clone(),
            "section" => record.section.clone(),
            "supporting_reference" => record.supporting_reference.clone(),
            _ => {
                let (party, field) = key.split_once('.')?;
                let party = match party {
                    "party1" => &self.parties[0],
                    "party2" => &self.parties[1],
                    _ => return None,
                };
                match field {
                    "name" => party.name.clone(),
                    "id_number" => party.id_number.clone(),
                    "title" => party.title.clone(),
                    _ => return None,
                }
            }
        };
        Some(value)
    }

    /// Value of one `{key|filter}` token; `None` leaves the token as written
    fn token(&self, token: &str) -> Option<String> {
        let (key, filter) = token.split_once('|').unwrap_or((token, ""));
        let case = TextCase::from_filter(filter)?;
        let value = self.lookup(key.trim())?;
        Some(self.case(case, &value))
    }

    /// Replace every known `{placeholder}` in a template
    fn fill(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };

            let token = &after[..end];
            match self.token(token) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push('{');
                    out.push_str(token);
                    out.push('}');
                }
            }
            rest = &after[end + 1..];
        }

        out.push_str(rest);
        out
    }

    fn fill_span(&self, span: &Span) -> Span {
        span.with_text(self.fill(&span.text))
    }
}

fn or_missing(value: &str) -> String {
    if value.trim().is_empty() {
        MISSING.to_string()
    } else {
        value.to_string()
    }
}

/// Builds documents for one variant
pub struct Composer<'v> {
    variant: &'v VariantConfig,
}

impl<'v> Composer<'v> {
    pub fn new(variant: &'v VariantConfig) -> Self {
        Self { variant }
    }

    /// Compose a document for a record
    ///
    /// # Arguments
    /// * `record` - The record to render
    /// * `totals` - Totals computed with the variant's price convention
    /// * `ctx` - Date fallback and logo source
    pub fn compose(&self, record: &Record, totals: &Totals, ctx: &ComposeContext<'_>) -> Document {
        let bindings = Bindings::new(record, self.variant, ctx.today);
        let mut doc = Document::default();

        for section in &self.variant.sections {
            self.compose_section(&mut doc, section, record, totals, &bindings, ctx);
        }

        if let Some(appendix) = self.appendix(record) {
            doc.push(Block::ImageAppendix(appendix));
        }

        debug!(
            "composed '{}' for record {:?}: {} blocks, {} items",
            self.variant.key,
            record.id,
            doc.blocks.len(),
            record.items.len()
        );
        doc
    }

    /// File name from the variant's template, without extension
    pub fn file_name(&self, record: &Record, today: NaiveDate) -> String {
        let bindings = Bindings::new(record, self.variant, today);
        sanitize_file_name(&bindings.fill(&self.variant.file_name))
    }

    fn compose_section(
        &self,
        doc: &mut Document,
        section: &Section,
        record: &Record,
        totals: &Totals,
        bindings: &Bindings<'_>,
        ctx: &ComposeContext<'_>,
    ) {
        match section {
            Section::Letterhead(letterhead) => {
                let logo = letterhead.logo.then(|| logo_slot(ctx));
                doc.push(Block::Letterhead(Letterhead {
                    logo,
                    lines: letterhead.lines.iter().map(|l| bindings.fill_span(l)).collect(),
                    rule: letterhead.rule,
                }));
            }
            Section::Title(title) => doc.push(Block::Title(TitleBlock {
                title: bindings.fill_span(&title.title),
                reference: title.reference.as_ref().map(|r| bindings.fill_span(r)),
            })),
            Section::Text(text) => doc.push(Block::Text(TextBlock {
                spans: text.spans.iter().map(|s| bindings.fill_span(s)).collect(),
                align: text.align,
                spacing_after: text.spacing_after,
                indent: text.indent,
            })),
            Section::DateSentence(sentence) => {
                doc.push(Block::Text(date_sentence(sentence, bindings.date)));
            }
            Section::KeyValue(kv) => self.key_value(doc, kv, bindings),
            Section::Party(party) => self.party(doc, party, bindings),
            Section::Statements(statements) => {
                for (index, template) in statements.items.iter().enumerate() {
                    doc.push(Block::Text(TextBlock {
                        spans: vec![
                            Span::new(format!("{}. ", index + 1)),
                            Span::new(bindings.fill(template)),
                        ],
                        align: statements.align,
                        spacing_after: 6.0,
                        indent: 18.0,
                    }));
                }
            }
            Section::ItemTable(table) => {
                doc.push(Block::ItemTable(self.item_table(table, record, totals)));
            }
            Section::Signature(signature) => {
                doc.push(Block::SignatureBlock(self.signature(signature, bindings)));
            }
            Section::PageBreak => doc.push(Block::PageBreak),
        }
    }

    fn key_value(&self, doc: &mut Document, kv: &KeyValueSection, bindings: &Bindings<'_>) {
        if let Some(heading) = &kv.heading {
            doc.push(Block::Text(TextBlock {
                spans: vec![bindings.fill_span(heading)],
                spacing_after: 2.0,
                ..TextBlock::default()
            }));
        }

        let rows = kv
            .rows
            .iter()
            .map(|row| {
                let mut value = Span::new(or_missing(&bindings.fill(&row.value)));
                value.bold = row.bold;
                KeyValueRow {
                    marker: None,
                    label: row.label.clone(),
                    value,
                }
            })
            .collect();

        doc.push(Block::KeyValueTable(KeyValueTable {
            rows,
            widths: kv.widths.clone(),
            footer: None,
        }));
    }

    fn party(&self, doc: &mut Document, section: &PartySection, bindings: &Bindings<'_>) {
        let party = bindings.party(section.party);

        if let Some(heading) = &section.heading {
            doc.push(Block::Text(TextBlock {
                spans: vec![bindings.fill_span(heading)],
                spacing_after: 2.0,
                ..TextBlock::default()
            }));
        }

        let mut name = Span::new(bindings.case(section.name_case, &party.name));
        name.bold = section.name_bold;
        let values = [
            ("Nama", name),
            ("NIP", Span::new(or_missing(&party.id_number))),
            ("Jabatan", Span::new(bindings.case(section.title_case, &party.title))),
        ];

        let numbered = section.numeral.is_some();
        let rows = values
            .into_iter()
            .enumerate()
            .map(|(index, (label, value))| KeyValueRow {
                marker: section.numeral.as_ref().map(|numeral| {
                    if index == 0 {
                        numeral.clone()
                    } else {
                        String::new()
                    }
                }),
                label: label.to_string(),
                value,
            })
            .collect();

        let designation = section.designation.as_ref().map(designation_spans);

        if numbered {
            doc.push(Block::KeyValueTable(KeyValueTable {
                rows,
                widths: NUMBERED_PARTY_WIDTHS.to_vec(),
                footer: designation,
            }));
        } else {
            doc.push(Block::KeyValueTable(KeyValueTable {
                rows,
                widths: PARTY_WIDTHS.to_vec(),
                footer: None,
            }));
            if let Some(spans) = designation {
                doc.push(Block::Text(TextBlock {
                    spans,
                    spacing_after: 6.0,
                    ..TextBlock::default()
                }));
            }
        }
    }

    fn item_table(
        &self,
        section: &crate::variant::ItemTableSection,
        record: &Record,
        totals: &Totals,
    ) -> ItemTable {
        let rows = record
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let line = totals
                    .lines
                    .get(index)
                    .copied()
                    .unwrap_or_else(|| LineTotals::compute(item, self.variant.price_convention));
                section
                    .columns
                    .iter()
                    .map(|column| self.item_cell(column, index, item, &line))
                    .collect()
            })
            .collect();

        let total = match &section.totals {
            TotalsRow::None => None,
            TotalsRow::InWords { prefix } => Some(TotalRow {
                label: format!("{}{}", prefix, totals.in_words),
                label_align: TextAlign::Left,
                amount: format_rupiah(totals.post_tax),
            }),
            TotalsRow::Sum { label } => Some(TotalRow {
                label: label.clone(),
                label_align: TextAlign::Center,
                amount: format_rupiah(totals.post_tax),
            }),
        };

        ItemTable {
            widths: section.columns.iter().map(|c| c.width).collect(),
            header: section.columns.iter().map(|c| c.header.clone()).collect(),
            header_shading: section.header_shading.clone(),
            rows,
            total,
            size: section.size,
        }
    }

    fn item_cell(
        &self,
        column: &ColumnSpec,
        index: usize,
        item: &LineItem,
        line: &LineTotals,
    ) -> ItemCell {
        let align = column.align.unwrap_or_else(|| column.kind.default_align());
        let cased = |value: &str| {
            or_missing(&column.case.apply(value.trim(), &self.variant.acronyms))
        };
        let unit = if item.unit.trim().is_empty() {
            self.variant.default_unit.as_str()
        } else {
            item.unit.as_str()
        };

        let text = match column.kind {
            ColumnKind::Number => (index + 1).to_string(),
            ColumnKind::NumberDotted => format!("{}.", index + 1),
            ColumnKind::Quantity => line.quantity.to_string(),
            ColumnKind::QuantityWithUnit => format!("{} {}", line.quantity, unit.trim())
                .trim_end()
                .to_string(),
            ColumnKind::Description | ColumnKind::DescriptionLines => {
                return description_cell(
                    &item.description,
                    column.kind == ColumnKind::DescriptionLines,
                    |l| column.case.apply(l, &self.variant.acronyms),
                    align,
                );
            }
            ColumnKind::Unit => cased(unit),
            ColumnKind::Brand => cased(&item.brand),
            ColumnKind::UnitPrice => format_rupiah(line.unit_price),
            ColumnKind::PreTax => format_rupiah(line.pre_tax),
            ColumnKind::Tax => format_rupiah(line.tax),
            ColumnKind::PostTax => format_rupiah(line.post_tax),
        };

        ItemCell::new(text, align)
    }

    fn signature(&self, section: &SignatureSection, bindings: &Bindings<'_>) -> SignatureBlock {
        SignatureBlock {
            left: signature_column(&section.left, bindings),
            right: signature_column(&section.right, bindings),
            gap: section.gap,
        }
    }

    /// One entry per filled image slot, items first, then slots
    fn appendix(&self, record: &Record) -> Option<ImageAppendix> {
        let config = &self.variant.appendix;
        let mut entries = Vec::new();

        for (item_index, item) in record.items.iter().enumerate() {
            for uri in item.image_uris() {
                let label = image_label(&config.label, entries.len() + 1, item_index + 1, item);
                let entry = match decode_image(uri) {
                    Ok(data) => AppendixEntry::Image {
                        label,
                        data,
                        width: config.width,
                        height: config.height,
                    },
                    Err(reason) => {
                        warn!("{} is not a usable image: {}", label, reason);
                        AppendixEntry::Placeholder {
                            message: format!("[Format tidak valid: {}]", label),
                            label,
                        }
                    }
                };
                entries.push(entry);
            }
        }

        if entries.is_empty() {
            return None;
        }
        Some(ImageAppendix {
            heading: config.heading.clone(),
            entries,
        })
    }
}

fn logo_slot(ctx: &ComposeContext<'_>) -> LogoSlot {
    match ctx.logo.map(|source| source.load_logo()) {
        Some(Ok(bytes)) => LogoSlot::Image(bytes),
        Some(Err(err)) => {
            warn!("letterhead logo unavailable, using placeholder: {}", err);
            LogoSlot::Placeholder(LOGO_PLACEHOLDER.to_string())
        }
        None => LogoSlot::Placeholder(LOGO_PLACEHOLDER.to_string()),
    }
}

fn date_sentence(section: &DateSentenceSection, date: NaiveDate) -> TextBlock {
    let narration = DateNarration::new(date);
    let spans = vec![
        Span::new(section.prefix.as_str()),
        section.weekday.style(Span::new(narration.weekday)),
        Span::new(section.day_joiner.as_str()),
        section.day.style(Span::new(narration.day)),
        Span::new(section.month_joiner.as_str()),
        section.month.style(Span::new(narration.month)),
        Span::new(section.year_joiner.as_str()),
        section.year.style(Span::new(narration.year)),
        Span::new(section.suffix.as_str()),
    ];

    TextBlock {
        spans: spans.into_iter().filter(|s| !s.text.is_empty()).collect(),
        align: section.align,
        spacing_after: 6.0,
        indent: 0.0,
    }
}

fn designation_spans(designation: &Designation) -> Vec<Span> {
    let mut prefix = Span::new(designation.prefix.as_str());
    let mut label = Span::new(designation.label.as_str());
    prefix.italic = designation.italic;
    label.italic = designation.italic;
    label.bold = designation.label_bold;
    vec![prefix, label]
        .into_iter()
        .filter(|s| !s.text.is_empty())
        .collect()
}

/// Description lines as cell lines; with `emphasize_name` the first is bold
fn description_cell(
    description: &str,
    emphasize_name: bool,
    case: impl Fn(&str) -> String,
    align: TextAlign,
) -> ItemCell {
    let mut lines: Vec<Span> = description
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| Span::new(case(line)))
        .collect();

    if lines.is_empty() {
        return ItemCell::new(MISSING, align);
    }
    if emphasize_name {
        lines[0].bold = true;
    }
    ItemCell { lines, align }
}

fn signature_column(side: &SignatureSide, bindings: &Bindings<'_>) -> SignatureColumn {
    let party = bindings.party(side.party);
    let mut above = Vec::new();

    if side.place_date {
        above.push(Span::new(bindings.fill("{place}, {date}")));
    }
    if let Some(caption) = &side.caption {
        above.push(Span::new(caption.as_str()));
    }
    if let Some(role) = &side.role {
        above.push(Span::new(role.as_str()).bold());
    }
    if side.show_title {
        above.push(Span::new(bindings.case(side.title_case, &party.title)));
    }

    let mut name = Span::new(bindings.case(side.name_case, &party.name));
    name.bold = side.name_bold;
    name.underline = side.name_underline;

    SignatureColumn {
        above,
        name,
        below: vec![Span::new(format!(
            "{}{}",
            side.id_prefix,
            or_missing(&party.id_number)
        ))],
    }
}

/// Expand `{n}`, `{item}` and `{description}` in an image label template
fn image_label(template: &str, sequence: usize, item_number: usize, item: &LineItem) -> String {
    let name = match item.name() {
        "" => format!("Item {}", item_number),
        name => name.to_string(),
    };
    template
        .replace("{n}", &sequence.to_string())
        .replace("{item}", &item_number.to_string())
        .replace("{description}", &name)
}

/// Payload bytes of an image data URI
fn decode_image(uri: &str) -> std::result::Result<Vec<u8>, String> {
    let decoded = doc_core::decode_data_uri(uri).map_err(|e| e.to_string())?;
    if !decoded.mime.starts_with("image/") {
        return Err(format!("unsupported media type {}", decoded.mime));
    }
    Ok(decoded.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::totals::PriceConvention;
    use pretty_assertions::assert_eq;

    const PNG_URI: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn sample_record() -> Record {
        Record {
            id: Some(1),
            reference_number: "000.2.1.1/938/1.07.06/2025".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 5),
            party1: Party::new("kusuma atmadja", "197001021993021003", ""),
            party2: Party::new("", "", "pengurus barang upt rsbg tuban"),
            goods_type: "Belanja Modal".to_string(),
            description: "Laptop".to_string(),
            supporting_reference: "027/BAP/2025".to_string(),
            items: vec![
                LineItem::new("Laptop ASUS\nRAM 16 GB")
                    .quantity(2)
                    .unit_price(1000.0)
                    .unit_tax(100.0)
                    .image(0, PNG_URI)
                    .image(1, PNG_URI),
                LineItem::new("Kursi").unit_price(500.0).image(1, "http://example.test/a.png"),
            ],
            ..Record::default()
        }
    }

    fn compose(key: &str, record: &Record) -> Document {
        let variant = VariantConfig::preset(key).unwrap();
        let totals = Totals::compute(&record.items, variant.price_convention);
        Composer::new(&variant).compose(record, &totals, &ComposeContext::new(today()))
    }

    fn texts(doc: &Document) -> Vec<String> {
        doc.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Text(text) => Some(text.plain_text()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_fill_placeholders() {
        let record = sample_record();
        let variant = VariantConfig::preset("bast").unwrap();
        let bindings = Bindings::new(&record, &variant, today());

        assert_eq!(bindings.fill("Nomor : {reference_number}"), "Nomor : 000.2.1.1/938/1.07.06/2025");
        assert_eq!(bindings.fill("{date}"), "05 Januari 2025");
        assert_eq!(bindings.fill("{party1.name|title}"), "Kusuma Atmadja");
        assert_eq!(bindings.fill("{party2.name}"), "M. NURHASIM");
        assert_eq!(
            bindings.fill("{party2.title|acronyms}"),
            "Pengurus Barang UPT RSBG Tuban"
        );
        assert_eq!(bindings.fill("{subject}"), "-");
        assert_eq!(bindings.fill("{unknown} {party3.name} {date|shout}"), "{unknown} {party3.name} {date|shout}");
        assert_eq!(bindings.fill("open { brace"), "open { brace");
    }

    #[test]
    fn test_missing_date_uses_today() {
        let record = Record::default();
        let variant = VariantConfig::preset("bast").unwrap();
        let bindings = Bindings::new(&record, &variant, today());
        assert_eq!(bindings.fill("{place}, {date}"), "Tuban, 10 Maret 2025");
    }

    #[test]
    fn test_bast_layout() {
        let doc = compose("bast", &sample_record());

        let Block::Title(title) = &doc.blocks[0] else {
            panic!("expected a title first");
        };
        assert_eq!(title.title.text, "BERITA ACARA PENYERAHAN BARANG/JASA");
        assert!(title.title.bold && title.title.underline);
        assert_eq!(
            title.reference.as_ref().map(|r| r.text.as_str()),
            Some("Nomor : 000.2.1.1/938/1.07.06/2025")
        );

        let sentences = texts(&doc);
        assert_eq!(
            sentences[0],
            "Pada hari ini Minggu tanggal Lima bulan Januari tahun Dua Ribu Dua Puluh Lima, kami yang bertanda tangan dibawah ini:"
        );
        assert!(sentences.iter().any(|s| s.starts_with("1. PIHAK KESATU telah menyerahkan barang / jasa hasil pekerjaan Belanja Modal berupa Laptop")));
        assert!(sentences.iter().any(|s| s.ends_with("Berita Acara Penerimaan 027/BAP/2025 Tanggal 05 Januari 2025")));

        // item table sits on the attachment page
        let break_at = doc.blocks.iter().position(|b| *b == Block::PageBreak).unwrap();
        let table_at = doc
            .blocks
            .iter()
            .position(|b| matches!(b, Block::ItemTable(_)))
            .unwrap();
        assert!(table_at > break_at);
        let signatures = doc
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::SignatureBlock(_)))
            .count();
        assert_eq!(signatures, 2);
    }

    #[test]
    fn test_numbered_party_block_uses_defaults() {
        let doc = compose("bast", &sample_record());
        let parties: Vec<&KeyValueTable> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::KeyValueTable(kv) if kv.is_numbered() => Some(kv),
                _ => None,
            })
            .collect();
        assert_eq!(parties.len(), 2);

        let first = parties[0];
        assert_eq!(first.rows[0].marker.as_deref(), Some("I."));
        assert_eq!(first.rows[1].marker.as_deref(), Some(""));
        assert_eq!(first.value_of("Nama"), Some("kusuma atmadja"));
        assert_eq!(first.value_of("Jabatan"), Some("Pejabat Pembuat Komitmen"));
        let footer = first.footer.as_ref().unwrap();
        assert_eq!(footer[0].text, "yang selanjutnya disebut ");
        assert_eq!(footer[1], Span::new("PIHAK KESATU.").bold());

        let second = parties[1];
        assert_eq!(second.value_of("Nama"), Some("M. NURHASIM"));
        assert_eq!(second.value_of("NIP"), Some("19800526 200901 1 003"));
    }

    #[test]
    fn test_bast_item_table() {
        let doc = compose("bast", &sample_record());
        let table = doc.item_tables().next().unwrap();

        assert_eq!(table.widths, vec![5.0, 7.0, 28.0, 20.0, 18.0, 22.0]);
        assert_eq!(table.rows.len(), 2);

        let laptop = &table.rows[0];
        assert_eq!(laptop[0].text(), "1");
        assert_eq!(laptop[1].text(), "2");
        assert_eq!(laptop[2].lines[0], Span::new("Laptop ASUS").bold());
        assert_eq!(laptop[2].lines[1], Span::new("RAM 16 GB"));
        assert_eq!(laptop[3].text(), "Rp 1.000");
        assert_eq!(laptop[4].text(), "Rp 100");
        assert_eq!(laptop[5].text(), "Rp 1.200");
        assert_eq!(laptop[5].align, TextAlign::Right);

        let total = table.total.as_ref().unwrap();
        assert_eq!(total.label, "TERBILANG : Seribu Tujuh Ratus Rupiah");
        assert_eq!(total.amount, "Rp 1.700");
    }

    #[test]
    fn test_appendix_order_and_placeholders() {
        let doc = compose("bast", &sample_record());
        let appendix = doc.appendix().unwrap();
        assert_eq!(appendix.heading, "Dokumentasi");

        let labels: Vec<&str> = appendix.entries.iter().map(AppendixEntry::label).collect();
        assert_eq!(labels, vec!["Gambar 1", "Gambar 2", "Gambar 3"]);
        assert!(matches!(appendix.entries[0], AppendixEntry::Image { width, height, .. } if width == 450.0 && height == 350.0));
        assert_eq!(
            appendix.entries[2],
            AppendixEntry::Placeholder {
                label: "Gambar 3".to_string(),
                message: "[Format tidak valid: Gambar 3]".to_string(),
            }
        );
        assert!(matches!(doc.blocks.last(), Some(Block::ImageAppendix(_))));
    }

    #[test]
    fn test_no_images_no_appendix() {
        let mut record = sample_record();
        for item in &mut record.items {
            item.images = [None, None];
        }
        assert!(compose("bast", &record).appendix().is_none());
    }

    #[test]
    fn test_labels_with_description() {
        let mut record = sample_record();
        record.items.push(LineItem::new("").image(0, PNG_URI));
        let doc = compose("tanda-terima", &record);
        let labels: Vec<&str> = doc
            .appendix()
            .unwrap()
            .entries
            .iter()
            .map(AppendixEntry::label)
            .collect();
        assert_eq!(
            labels,
            vec![
                "Gambar 1 - Laptop ASUS",
                "Gambar 2 - Laptop ASUS",
                "Gambar 3 - Kursi",
                "Gambar 4 - Item 3"
            ]
        );
    }

    #[test]
    fn test_logo_placeholder_without_source() {
        let doc = compose("tanda-terima", &sample_record());
        let Block::Letterhead(letterhead) = &doc.blocks[0] else {
            panic!("expected a letterhead first");
        };
        assert_eq!(letterhead.logo, Some(LogoSlot::Placeholder("LOGO".to_string())));
        assert_eq!(letterhead.lines[0].text, "PEMERINTAH PROVINSI JAWA TIMUR");
        assert!(letterhead.rule);
    }

    #[test]
    fn test_failing_logo_degrades() {
        let variant = VariantConfig::preset("nota-dinas").unwrap();
        let record = sample_record();
        let totals = Totals::compute(&record.items, variant.price_convention);
        let failing = || -> Result<Vec<u8>> { Err(ComposeError::LogoUnavailable("404".to_string())) };
        let ctx = ComposeContext::new(today()).with_logo(&failing);

        let doc = Composer::new(&variant).compose(&record, &totals, &ctx);
        let Block::Letterhead(letterhead) = &doc.blocks[0] else {
            panic!("expected a letterhead first");
        };
        assert_eq!(letterhead.logo, Some(LogoSlot::Placeholder("LOGO".to_string())));
    }

    #[test]
    fn test_static_logo_used() {
        let variant = VariantConfig::preset("tanda-terima").unwrap();
        let record = Record::default();
        let totals = Totals::compute(&record.items, variant.price_convention);
        let logo = StaticLogo(vec![1, 2, 3]);
        let ctx = ComposeContext::new(today()).with_logo(&logo);

        let doc = Composer::new(&variant).compose(&record, &totals, &ctx);
        let Block::Letterhead(letterhead) = &doc.blocks[0] else {
            panic!("expected a letterhead first");
        };
        assert_eq!(letterhead.logo, Some(LogoSlot::Image(vec![1, 2, 3])));
        assert!(StaticLogo::default().load_logo().is_err());
    }

    #[test]
    fn test_tanda_terima_signature_columns() {
        let doc = compose("tanda-terima", &sample_record());
        let signature = doc
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::SignatureBlock(s) => Some(s),
                _ => None,
            })
            .unwrap();

        let left: Vec<&str> = signature.left.above.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(left, vec!["Pihak Yang Menerima", "Pengurus Barang Upt Rsbg Tuban"]);
        assert_eq!(signature.left.name.text, "-");
        assert_eq!(signature.left.below[0].text, "NIP. -");

        let right: Vec<&str> = signature.right.above.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(
            right,
            vec!["Tuban, 05 Januari 2025", "Pihak Yang Menyerahkan", "Pengurus Barang UPT RSBG Tuban"]
        );
        assert_eq!(signature.right.name.text, "Kusuma Atmadja");
        assert!(signature.right.name.bold && signature.right.name.underline);
    }

    #[test]
    fn test_tanda_terima_items_title_cased() {
        let mut record = sample_record();
        record.items = vec![LineItem::new("KERTAS HVS").quantity(5).unit("rim").brand("")];
        let doc = compose("tanda-terima", &record);
        let table = doc.item_tables().next().unwrap();
        let row: Vec<String> = table.rows[0].iter().map(ItemCell::text).collect();
        assert_eq!(row, vec!["1.", "Kertas Hvs", "5", "Rim", "-"]);
        assert!(table.total.is_none());
    }

    #[test]
    fn test_nota_dinas_memo_and_totals() {
        let record = Record {
            party1: Party::new("kepala upt", "1", "kepala upt rsbg"),
            section: "tata usaha".to_string(),
            subject: "permohonan atk".to_string(),
            supporting_reference: "ND/7".to_string(),
            items: vec![
                LineItem::new("map upt").quantity(3).unit_price(5000.0),
                LineItem::new("Pulpen").quantity(2).unit_price(2500.0).unit("Kotak"),
            ],
            ..Record::default()
        };
        let doc = compose("nota-dinas", &record);

        let memo = doc
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::KeyValueTable(kv) if kv.value_of("Kepada Yth").is_some() => Some(kv),
                _ => None,
            })
            .unwrap();
        assert_eq!(memo.value_of("Kepada Yth"), Some("Kepala UPT"));
        assert_eq!(memo.value_of("Dari"), Some("-"));
        assert_eq!(memo.value_of("Nomor"), Some("ND/7"));
        assert_eq!(memo.value_of("Perihal"), Some("Permohonan Atk"));
        assert_eq!(memo.value_of("Tanggal"), Some("10 Maret 2025"));

        assert!(texts(&doc).iter().any(|t| t.contains("Sub Bagian Tata Usaha di UPT")));

        let table = doc.item_tables().next().unwrap();
        let first: Vec<String> = table.rows[0].iter().map(ItemCell::text).collect();
        assert_eq!(first, vec!["1", "Map UPT", "3 Pcs", "Rp 5.000", "Rp 15.000"]);
        assert_eq!(table.rows[1][2].text(), "2 Kotak");
        let total = table.total.as_ref().unwrap();
        assert_eq!(total.label, "Jumlah");
        assert_eq!(total.amount, "Rp 20.000");
    }

    #[test]
    fn test_empty_record_still_composes() {
        for key in VariantConfig::preset_keys() {
            let doc = compose(key, &Record::default());
            let table = doc.item_tables().next().unwrap();
            assert!(table.rows.is_empty());
            assert!(doc.appendix().is_none());
        }
    }

    #[test]
    fn test_file_names() {
        let record = Record {
            reference_number: "000.2/938:1?".to_string(),
            description: "Laptop \"Kantor\"".to_string(),
            ..Record::default()
        };
        let name = |key: &str| {
            let variant = VariantConfig::preset(key).unwrap();
            Composer::new(&variant).file_name(&record, today())
        };
        assert_eq!(name("bast"), "BAP_Laptop _Kantor_");
        assert_eq!(name("tanda-terima"), "Tanda_Terima_Pendistribusian_Barang_000.2_938_1_");
        assert_eq!(name("nota-dinas"), "NOTA_DINAS_000.2_938_1_");
    }

    #[test]
    fn test_per_unit_line_values() {
        let item = LineItem::new("A").quantity(3).unit_price(10.0);
        let line = LineTotals::compute(&item, PriceConvention::PerUnit);
        assert_eq!(line.pre_tax, 30.0);
    }
}
