//! Backend-neutral document tree
//!
//! A [`DocTree`] is an ordered list of block nodes: paragraphs made of styled
//! runs, tables whose cells hold paragraphs, and explicit page breaks. Sizes
//! are in points; a `None` run size means the page's default font size.

use crate::document::Color;
use crate::Align;

/// A complete document body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocTree {
    pub nodes: Vec<Node>,
}

/// Top-level block
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Paragraph(Paragraph),
    Table(Table),
    PageBreak,
}

/// A block of inline runs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub align: Align,
    /// Space above, in points
    pub spacing_before: f64,
    /// Space below, in points
    pub spacing_after: f64,
    /// Left indent, in points
    pub indent: f64,
}

/// Inline content
#[derive(Debug, Clone, PartialEq)]
pub enum Run {
    Text(TextRun),
    Image(ImageRun),
    /// Forced line break
    Break,
}

/// Styled text
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub size: Option<f32>,
    pub color: Color,
}

/// Inline raster image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRun {
    /// JPEG or PNG bytes
    pub data: Vec<u8>,
    /// Box width in points; the image is fitted inside preserving aspect
    pub width: f64,
    /// Box height in points
    pub height: f64,
    /// Label shown when the bytes cannot be decoded
    pub alt: String,
}

/// Grid of cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<Row>,
    /// Column widths as percentages of the content width
    pub widths: Vec<f64>,
    pub bordered: bool,
}

/// One table row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

/// Vertical placement inside a cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VAlign {
    #[default]
    Top,
    Center,
}

/// One table cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub content: Vec<Paragraph>,
    /// Number of grid columns covered
    pub span: usize,
    /// Inner padding in points
    pub padding: f64,
    pub valign: VAlign,
    pub shading: Option<Color>,
}

impl DocTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Every image run in document order, including those inside tables
    pub fn images(&self) -> Vec<&ImageRun> {
        let mut out = Vec::new();
        for node in &self.nodes {
            match node {
                Node::Paragraph(p) => collect_images(p, &mut out),
                Node::Table(t) => {
                    for cell in t.rows.iter().flat_map(|r| r.cells.iter()) {
                        for p in &cell.content {
                            collect_images(p, &mut out);
                        }
                    }
                }
                Node::PageBreak => {}
            }
        }
        out
    }

    /// Plain text of every paragraph and cell, one entry per paragraph
    pub fn plain_text(&self) -> Vec<String> {
        let mut out = Vec::new();
        for node in &self.nodes {
            match node {
                Node::Paragraph(p) => out.push(p.plain_text()),
                Node::Table(t) => {
                    for cell in t.rows.iter().flat_map(|r| r.cells.iter()) {
                        out.extend(cell.content.iter().map(Paragraph::plain_text));
                    }
                }
                Node::PageBreak => {}
            }
        }
        out
    }
}

fn collect_images<'a>(p: &'a Paragraph, out: &mut Vec<&'a ImageRun>) {
    for run in &p.runs {
        if let Run::Image(img) = run {
            out.push(img);
        }
    }
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paragraph holding a single plain run
    pub fn text(text: impl Into<String>) -> Self {
        Self::new().run(TextRun::new(text))
    }

    pub fn run(mut self, run: TextRun) -> Self {
        self.runs.push(Run::Text(run));
        self
    }

    pub fn image(mut self, image: ImageRun) -> Self {
        self.runs.push(Run::Image(image));
        self
    }

    pub fn line_break(mut self) -> Self {
        self.runs.push(Run::Break);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn spacing(mut self, before: f64, after: f64) -> Self {
        self.spacing_before = before;
        self.spacing_after = after;
        self
    }

    pub fn indent(mut self, indent: f64) -> Self {
        self.indent = indent;
        self
    }

    /// Concatenated run text; breaks become newlines
    pub fn plain_text(&self) -> String {
        self.runs
            .iter()
            .map(|r| match r {
                Run::Text(t) => t.text.as_str(),
                Run::Break => "\n",
                Run::Image(_) => "",
            })
            .collect()
    }
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
            underline: false,
            size: None,
            color: Color::black(),
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

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl ImageRun {
    pub fn new(data: Vec<u8>, width: f64, height: f64, alt: impl Into<String>) -> Self {
        Self {
            data,
            width,
            height,
            alt: alt.into(),
        }
    }
}

impl Table {
    /// Table with the given column percentages
    pub fn new(widths: Vec<f64>) -> Self {
        Self {
            rows: Vec::new(),
            widths,
            bordered: false,
        }
    }

    pub fn bordered(mut self, bordered: bool) -> Self {
        self.bordered = bordered;
        self
    }

    pub fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    /// Number of grid columns
    pub fn column_count(&self) -> usize {
        let from_rows = self
            .rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.span.max(1)).sum::<usize>())
            .max()
            .unwrap_or(0);
        self.widths.len().max(from_rows)
    }
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }
}

impl Cell {
    pub fn new(content: Vec<Paragraph>) -> Self {
        Self {
            content,
            span: 1,
            padding: 0.0,
            valign: VAlign::Top,
            shading: None,
        }
    }

    /// Cell holding one paragraph
    pub fn paragraph(paragraph: Paragraph) -> Self {
        Self::new(vec![paragraph])
    }

    /// Cell holding one plain text paragraph
    pub fn text(text: impl Into<String>) -> Self {
        Self::paragraph(Paragraph::text(text))
    }

    pub fn span(mut self, span: usize) -> Self {
        self.span = span.max(1);
        self
    }

    pub fn padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn valign(mut self, valign: VAlign) -> Self {
        self.valign = valign;
        self
    }

    pub fn shading(mut self, color: Color) -> Self {
        self.shading = Some(color);
        self
    }
}
