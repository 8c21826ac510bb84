//! Document rendering
//!
//! Lowers a composed [`Document`] into the backend-neutral [`DocTree`].

use crate::schema::*;
use doc_core::{Cell, Color, DocTree, ImageRun, Node, Paragraph, Row, Table, TextRun, VAlign};

/// Letterhead underline
const RULE: &str = "_______________________________________________________________________________";

const LOGO_SIZE: f64 = 60.0;
const LETTERHEAD_WIDTHS: [f64; 2] = [15.0, 85.0];
const SIGNATURE_WIDTHS: [f64; 2] = [50.0, 50.0];

const KEY_VALUE_PADDING: f64 = 1.5;
const ITEM_PADDING: f64 = 3.0;

/// Converts a composed document into a render tree
pub struct DocumentRenderer<'a> {
    document: &'a Document,
}

impl<'a> DocumentRenderer<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Build the render tree
    pub fn to_tree(&self) -> DocTree {
        let mut tree = DocTree::new();
        for block in &self.document.blocks {
            self.render_block(&mut tree, block);
        }
        tree
    }

    fn render_block(&self, tree: &mut DocTree, block: &Block) {
        match block {
            Block::Letterhead(letterhead) => render_letterhead(tree, letterhead),
            Block::Title(title) => {
                let mut paragraph = Paragraph::new()
                    .run(text_run(&title.title, None))
                    .align(doc_core::Align::Center);
                if let Some(reference) = &title.reference {
                    paragraph = paragraph.line_break().run(text_run(reference, None));
                }
                tree.push(Node::Paragraph(paragraph.spacing(0.0, 12.0)));
            }
            Block::Text(text) => tree.push(Node::Paragraph(text_paragraph(text))),
            Block::KeyValueTable(kv) => render_key_value(tree, kv),
            Block::ItemTable(table) => render_item_table(tree, table),
            Block::SignatureBlock(signature) => render_signature(tree, signature),
            Block::PageBreak => tree.push(Node::PageBreak),
            Block::ImageAppendix(appendix) => render_appendix(tree, appendix),
        }
    }
}

/// Map a span to a text run; `size` overrides an unset span size
pub fn text_run(span: &Span, size: Option<f32>) -> TextRun {
    let mut run = TextRun::new(span.text.as_str());
    run.bold = span.bold;
    run.italic = span.italic;
    run.underline = span.underline;
    run.size = span.size.or(size);
    if let Some(color) = span.color.as_deref().and_then(hex_color) {
        run.color = color;
    }
    run
}

fn spans_paragraph(spans: &[Span], size: Option<f32>) -> Paragraph {
    spans
        .iter()
        .fold(Paragraph::new(), |p, span| p.run(text_run(span, size)))
}

fn text_paragraph(text: &TextBlock) -> Paragraph {
    spans_paragraph(&text.spans, None)
        .align(text.align.into())
        .spacing(0.0, text.spacing_after)
        .indent(text.indent)
}

fn render_letterhead(tree: &mut DocTree, letterhead: &Letterhead) {
    let lines: Vec<Paragraph> = letterhead
        .lines
        .iter()
        .map(|line| {
            Paragraph::new()
                .run(text_run(line, None))
                .align(doc_core::Align::Center)
        })
        .collect();

    match &letterhead.logo {
        Some(slot) => {
            let logo = match slot {
                LogoSlot::Image(data) => {
                    Paragraph::new().image(ImageRun::new(data.clone(), LOGO_SIZE, LOGO_SIZE, "Logo"))
                }
                LogoSlot::Placeholder(text) => Paragraph::new()
                    .run(TextRun::new(text.as_str()).bold().color(Color::light_gray()))
                    .align(doc_core::Align::Center),
            };
            let row = Row::new(vec![
                Cell::paragraph(logo).valign(VAlign::Center),
                Cell::new(lines).valign(VAlign::Center),
            ]);
            tree.push(Node::Table(
                Table::new(LETTERHEAD_WIDTHS.to_vec()).bordered(false).row(row),
            ));
        }
        None => {
            for line in lines {
                tree.push(Node::Paragraph(line));
            }
        }
    }

    if letterhead.rule {
        tree.push(Node::Paragraph(
            Paragraph::new()
                .run(TextRun::new(RULE).bold().size(10.0))
                .align(doc_core::Align::Center)
                .spacing(0.0, 10.0),
        ));
    }
}

fn render_key_value(tree: &mut DocTree, kv: &KeyValueTable) {
    let numbered = kv.is_numbered();
    let mut table = Table::new(kv.widths.clone()).bordered(false);

    for row in &kv.rows {
        let mut cells = Vec::with_capacity(4);
        if numbered {
            cells.push(Cell::text(row.marker.clone().unwrap_or_default()));
        }
        cells.push(Cell::text(row.label.as_str()));
        cells.push(Cell::text(":"));
        cells.push(Cell::paragraph(Paragraph::new().run(text_run(&row.value, None))));
        table = table.row(Row::new(
            cells
                .into_iter()
                .map(|c| c.padding(KEY_VALUE_PADDING))
                .collect(),
        ));
    }

    if let Some(footer) = &kv.footer {
        let mut cells = Vec::new();
        let mut span = kv.widths.len();
        if numbered {
            cells.push(Cell::text(""));
            span -= 1;
        }
        cells.push(
            Cell::paragraph(spans_paragraph(footer, None))
                .span(span)
                .padding(KEY_VALUE_PADDING),
        );
        table = table.row(Row::new(cells));
    }

    tree.push(Node::Table(table));
    tree.push(Node::Paragraph(Paragraph::new().spacing(0.0, 4.0)));
}

fn render_item_table(tree: &mut DocTree, table: &ItemTable) {
    let mut out = Table::new(table.widths.clone()).bordered(true);
    let shading = table.header_shading.as_deref().and_then(hex_color);

    let header = table
        .header
        .iter()
        .map(|title| {
            let cell = Cell::paragraph(
                Paragraph::new()
                    .run(TextRun::new(title.as_str()).bold().size_opt(table.size))
                    .align(doc_core::Align::Center),
            )
            .padding(ITEM_PADDING)
            .valign(VAlign::Center);
            match shading {
                Some(color) => cell.shading(color),
                None => cell,
            }
        })
        .collect();
    out = out.row(Row::new(header));

    for row in &table.rows {
        let cells = row
            .iter()
            .map(|cell| {
                Cell::paragraph(item_paragraph(cell, table.size))
                    .padding(ITEM_PADDING)
                    .valign(VAlign::Center)
            })
            .collect();
        out = out.row(Row::new(cells));
    }

    if let Some(total) = &table.total {
        let span = table.widths.len().saturating_sub(1).max(1);
        let label = Cell::paragraph(
            Paragraph::new()
                .run(TextRun::new(total.label.as_str()).bold().size_opt(table.size))
                .align(total.label_align.into()),
        )
        .span(span)
        .padding(ITEM_PADDING)
        .valign(VAlign::Center);
        let amount = Cell::paragraph(
            Paragraph::new()
                .run(TextRun::new(total.amount.as_str()).bold().size_opt(table.size))
                .align(doc_core::Align::Right),
        )
        .padding(ITEM_PADDING)
        .valign(VAlign::Center);
        out = out.row(Row::new(vec![label, amount]));
    }

    tree.push(Node::Table(out));
    tree.push(Node::Paragraph(Paragraph::new().spacing(0.0, 6.0)));
}

fn item_paragraph(cell: &ItemCell, size: Option<f32>) -> Paragraph {
    let mut paragraph = Paragraph::new().align(cell.align.into());
    for (index, line) in cell.lines.iter().enumerate() {
        if index > 0 {
            paragraph = paragraph.line_break();
        }
        paragraph = paragraph.run(text_run(line, size));
    }
    paragraph
}

fn render_signature(tree: &mut DocTree, signature: &SignatureBlock) {
    // Pad the shorter heading so both names sit on the same line
    let lines = signature.left.above.len().max(signature.right.above.len());
    let column = |side: &SignatureColumn| {
        let mut content: Vec<Paragraph> = (side.above.len()..lines)
            .map(|_| Paragraph::new())
            .collect();
        content.extend(side.above.iter().map(|span| {
            Paragraph::new()
                .run(text_run(span, None))
                .align(doc_core::Align::Center)
        }));
        content.push(Paragraph::new().spacing(0.0, signature.gap));
        content.push(
            Paragraph::new()
                .run(text_run(&side.name, None))
                .align(doc_core::Align::Center),
        );
        content.extend(side.below.iter().map(|span| {
            Paragraph::new()
                .run(text_run(span, None))
                .align(doc_core::Align::Center)
        }));
        Cell::new(content)
    };

    tree.push(Node::Table(
        Table::new(SIGNATURE_WIDTHS.to_vec())
            .bordered(false)
            .row(Row::new(vec![column(&signature.left), column(&signature.right)])),
    ));
}

fn render_appendix(tree: &mut DocTree, appendix: &ImageAppendix) {
    tree.push(Node::PageBreak);
    tree.push(Node::Paragraph(
        Paragraph::new()
            .run(TextRun::new(appendix.heading.as_str()).bold().size(14.0))
            .align(doc_core::Align::Center)
            .spacing(0.0, 12.0),
    ));

    for entry in &appendix.entries {
        match entry {
            AppendixEntry::Image {
                label,
                data,
                width,
                height,
            } => {
                tree.push(Node::Paragraph(
                    Paragraph::new()
                        .run(
                            TextRun::new(label.as_str())
                                .bold()
                                .size(11.0)
                                .color(Color::from_rgb(0x33, 0x33, 0x33)),
                        )
                        .spacing(6.0, 4.0),
                ));
                tree.push(Node::Paragraph(
                    Paragraph::new()
                        .image(ImageRun::new(data.clone(), *width, *height, label.as_str()))
                        .align(doc_core::Align::Center)
                        .spacing(0.0, 12.0),
                ));
            }
            AppendixEntry::Placeholder { message, .. } => {
                tree.push(Node::Paragraph(
                    Paragraph::new()
                        .run(
                            TextRun::new(message.as_str())
                                .italic()
                                .size(10.0)
                                .color(Color::from_rgb(0xFF, 0x66, 0x00)),
                        )
                        .spacing(6.0, 12.0),
                ));
            }
        }
    }
}

trait SizeExt {
    fn size_opt(self, size: Option<f32>) -> Self;
}

impl SizeExt for TextRun {
    fn size_opt(mut self, size: Option<f32>) -> Self {
        if size.is_some() {
            self.size = size;
        }
        self
    }
}
