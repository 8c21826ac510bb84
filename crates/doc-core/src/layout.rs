//! PDF backend: flows a [`DocTree`] onto A4 pages
//!
//! Layout is a single top-down pass. Paragraph lines may move to the next
//! page one at a time; table rows move as a whole.

use crate::backend::RenderBackend;
use crate::document::{Color, PdfDocument};
use crate::font::StandardFont;
use crate::image::fit_within;
use crate::text::calculate_x_offset;
use crate::tree::{Cell, DocTree, Node, Paragraph, Run, Table, TextRun, VAlign};
use crate::{Align, PageSetup, Result};

/// Baseline position below the top of a text line, as a fraction of font size
const ASCENT: f64 = 0.8;

/// Underline offset below the baseline, as a fraction of font size
const UNDERLINE_OFFSET: f64 = 0.12;

/// Border stroke width for bordered tables
const BORDER_WIDTH: f64 = 0.5;

/// Renders documents as PDF using the standard Times fonts
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfBackend;

impl PdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl RenderBackend for PdfBackend {
    fn render(&self, tree: &DocTree, setup: &PageSetup) -> Result<Vec<u8>> {
        let mut layout = Layout::new(setup);
        for node in &tree.nodes {
            layout.node(node)?;
        }
        log::debug!("pdf layout finished with {} page(s)", layout.doc.page_count());
        layout.doc.to_bytes()
    }

    fn file_extension(&self) -> &'static str {
        "pdf"
    }

    fn mime_type(&self) -> &'static str {
        "application/pdf"
    }
}

/// A positioned piece of a line
#[derive(Debug)]
enum Fragment<'t> {
    Text {
        text: String,
        font: StandardFont,
        size: f32,
        color: Color,
        underline: bool,
        width: f64,
    },
    Image {
        data: &'t [u8],
        width: f64,
        height: f64,
    },
}

impl Fragment<'_> {
    fn width(&self) -> f64 {
        match self {
            Fragment::Text { width, .. } | Fragment::Image { width, .. } => *width,
        }
    }
}

/// One laid-out line of a paragraph
#[derive(Debug, Default)]
struct Line<'t> {
    fragments: Vec<Fragment<'t>>,
    width: f64,
    /// Largest font size on the line
    text_size: f32,
    /// Tallest image on the line
    image_height: f64,
}

impl Line<'_> {
    fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    fn height(&self, setup: &PageSetup) -> f64 {
        let size = if self.text_size > 0.0 {
            self.text_size
        } else if self.image_height > 0.0 {
            0.0
        } else {
            setup.font_size
        };
        (size as f64 * setup.line_spacing).max(self.image_height)
    }

    fn baseline(&self, setup: &PageSetup) -> f64 {
        let size = self.text_size as f64;
        self.height(setup) - size * setup.line_spacing + size * ASCENT
    }
}

/// Greedy line breaker for one paragraph
struct LineBreaker<'t> {
    available: f64,
    lines: Vec<Line<'t>>,
    current: Line<'t>,
    pending_space: bool,
}

impl<'t> LineBreaker<'t> {
    fn new(available: f64) -> Self {
        Self {
            available,
            lines: Vec::new(),
            current: Line::default(),
            pending_space: false,
        }
    }

    fn finish_line(&mut self) {
        self.lines.push(std::mem::take(&mut self.current));
        self.pending_space = false;
    }

    fn push_text(&mut self, run: &TextRun, default_size: f32) {
        let font = StandardFont::from_flags(run.bold, run.italic);
        let size = run.size.unwrap_or(default_size);

        for (i, segment) in run.text.split('\n').enumerate() {
            if i > 0 {
                self.finish_line();
            }
            for (j, word) in segment.split(' ').enumerate() {
                if j > 0 {
                    self.pending_space = true;
                }
                if !word.is_empty() {
                    self.push_word(word, font, size, run);
                }
            }
        }
    }

    fn push_word(&mut self, word: &str, font: StandardFont, size: f32, run: &TextRun) {
        let word_width = font.text_width_points(word, size);
        let space_width = if self.pending_space && !self.current.is_empty() {
            font.text_width_points(" ", size)
        } else {
            0.0
        };

        if !self.current.is_empty() && self.current.width + space_width + word_width > self.available
        {
            self.finish_line();
            self.append_text(word, font, size, run, word_width);
        } else if space_width > 0.0 {
            self.append_text(&format!(" {word}"), font, size, run, space_width + word_width);
        } else {
            self.append_text(word, font, size, run, word_width);
        }
        self.pending_space = false;
    }

    /// Add text to the line, merging into the previous fragment when the style matches
    fn append_text(&mut self, text: &str, font: StandardFont, size: f32, run: &TextRun, width: f64) {
        self.current.width += width;
        self.current.text_size = self.current.text_size.max(size);

        if let Some(Fragment::Text {
            text: prev,
            font: prev_font,
            size: prev_size,
            color: prev_color,
            underline: prev_underline,
            width: prev_width,
        }) = self.current.fragments.last_mut()
        {
            if *prev_font == font
                && *prev_size == size
                && *prev_color == run.color
                && *prev_underline == run.underline
            {
                prev.push_str(text);
                *prev_width += width;
                return;
            }
        }

        self.current.fragments.push(Fragment::Text {
            text: text.to_string(),
            font,
            size,
            color: run.color,
            underline: run.underline,
            width,
        });
    }

    fn push_image(&mut self, data: &'t [u8], width: f64, height: f64) {
        if !self.current.is_empty() && self.current.width + width > self.available {
            self.finish_line();
        }
        self.current.width += width;
        self.current.image_height = self.current.image_height.max(height);
        self.current.fragments.push(Fragment::Image {
            data,
            width,
            height,
        });
        self.pending_space = false;
    }

    fn into_lines(mut self) -> Vec<Line<'t>> {
        if !self.current.is_empty() || self.lines.is_empty() {
            self.lines.push(self.current);
        }
        self.lines
    }
}

/// A paragraph broken into lines, ready to draw
struct FlowedParagraph<'t> {
    paragraph: &'t Paragraph,
    lines: Vec<Line<'t>>,
}

impl FlowedParagraph<'_> {
    fn height(&self, setup: &PageSetup) -> f64 {
        self.paragraph.spacing_before
            + self.lines.iter().map(|l| l.height(setup)).sum::<f64>()
            + self.paragraph.spacing_after
    }
}

struct Layout<'s> {
    setup: &'s PageSetup,
    doc: PdfDocument,
    page: usize,
    /// Cursor, in points from the top of the page
    y: f64,
}

impl<'s> Layout<'s> {
    fn new(setup: &'s PageSetup) -> Self {
        let mut doc = PdfDocument::new(setup.width, setup.height);
        let page = doc.add_blank_page();
        Self {
            setup,
            doc,
            page,
            y: setup.margin_top,
        }
    }

    fn new_page(&mut self) {
        self.page = self.doc.add_blank_page();
        self.y = self.setup.margin_top;
    }

    fn at_page_top(&self) -> bool {
        self.y <= self.setup.margin_top
    }

    fn fits(&self, height: f64) -> bool {
        self.y + height <= self.setup.content_bottom()
    }

    fn node(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::Paragraph(p) => self.paragraph(p),
            Node::Table(t) => self.table(t),
            Node::PageBreak => {
                self.new_page();
                Ok(())
            }
        }
    }

    /// Break a paragraph into lines; undecodable images become placeholder text
    fn flow<'t>(&mut self, paragraph: &'t Paragraph, width: f64) -> FlowedParagraph<'t> {
        let available = (width - paragraph.indent).max(0.0);
        let mut breaker = LineBreaker::new(available);

        for run in &paragraph.runs {
            match run {
                Run::Text(text) => breaker.push_text(text, self.setup.font_size),
                Run::Break => breaker.finish_line(),
                Run::Image(image) => match self.doc.register_image(&image.data) {
                    Ok((px_w, px_h)) => {
                        let (w, h) =
                            fit_within(px_w, px_h, image.width.min(available), image.height);
                        breaker.push_image(&image.data, w, h);
                    }
                    Err(e) => {
                        log::warn!("image '{}' could not be decoded: {e}", image.alt);
                        let placeholder = TextRun::new(format!("[Error loading: {}]", image.alt))
                            .italic()
                            .color(Color::red());
                        breaker.push_text(&placeholder, self.setup.font_size);
                    }
                },
            }
        }

        FlowedParagraph {
            paragraph,
            lines: breaker.into_lines(),
        }
    }

    fn paragraph(&mut self, paragraph: &Paragraph) -> Result<()> {
        let left = self.setup.margin_left;
        let width = self.setup.content_width();
        let flowed = self.flow(paragraph, width);

        self.y += paragraph.spacing_before;

        for line in &flowed.lines {
            let height = line.height(self.setup);
            if !self.fits(height) && !self.at_page_top() {
                self.new_page();
            }
            self.draw_line(line, paragraph, left, width)?;
            self.y += height;
        }

        self.y += paragraph.spacing_after;
        Ok(())
    }

    /// Draw one line at the cursor
    fn draw_line(&mut self, line: &Line<'_>, paragraph: &Paragraph, left: f64, width: f64) -> Result<()> {
        let available = (width - paragraph.indent).max(0.0);
        let mut x = left
            + paragraph.indent
            + calculate_x_offset(line.width, available, paragraph.align);
        let top = self.y;
        let baseline = top + line.baseline(self.setup);

        for fragment in &line.fragments {
            match fragment {
                Fragment::Text {
                    text,
                    font,
                    size,
                    color,
                    underline,
                    width,
                } => {
                    self.doc
                        .insert_text(text, self.page, x, baseline, *font, *size, *color, Align::Left)?;
                    if *underline {
                        let uy = baseline + *size as f64 * UNDERLINE_OFFSET;
                        let thickness = (*size as f64 / 20.0).max(0.5);
                        self.doc
                            .draw_line(self.page, (x, uy), (x + width, uy), thickness, *color)?;
                    }
                }
                Fragment::Image {
                    data,
                    width,
                    height,
                } => {
                    self.doc
                        .insert_image(data, self.page, x, top, *width, *height)?;
                }
            }
            x += fragment.width();
        }

        Ok(())
    }

    /// Column widths in points for a table
    fn column_widths(&self, table: &Table) -> Vec<f64> {
        let columns = table.column_count();
        if columns == 0 {
            return Vec::new();
        }

        let mut pct: Vec<f64> = (0..columns)
            .map(|i| table.widths.get(i).copied().unwrap_or(0.0).max(0.0))
            .collect();

        let missing = table.widths.len().min(columns);
        if missing < columns {
            let leftover = (100.0 - pct.iter().sum::<f64>()).max(0.0);
            let share = if leftover > 0.0 {
                leftover / (columns - missing) as f64
            } else {
                100.0 / columns as f64
            };
            for p in pct.iter_mut().skip(missing) {
                *p = share;
            }
        }

        let total: f64 = pct.iter().sum();
        let content = self.setup.content_width();
        if total <= 0.0 {
            return vec![content / columns as f64; columns];
        }
        pct.iter().map(|p| p / total * content).collect()
    }

    fn table(&mut self, table: &Table) -> Result<()> {
        let widths = self.column_widths(table);
        let left = self.setup.margin_left;

        for row in &table.rows {
            // Place cells on the grid
            let mut placed: Vec<(&Cell, f64, f64)> = Vec::with_capacity(row.cells.len());
            let mut column = 0;
            for cell in &row.cells {
                if column >= widths.len() {
                    break;
                }
                let end = (column + cell.span.max(1)).min(widths.len());
                let x = left + widths[..column].iter().sum::<f64>();
                let w = widths[column..end].iter().sum::<f64>();
                placed.push((cell, x, w));
                column = end;
            }

            let mut flowed: Vec<Vec<FlowedParagraph<'_>>> = Vec::with_capacity(placed.len());
            for (cell, _, w) in &placed {
                let inner = (w - 2.0 * cell.padding).max(0.0);
                let mut paras = Vec::with_capacity(cell.content.len());
                for p in &cell.content {
                    paras.push(self.flow(p, inner));
                }
                flowed.push(paras);
            }

            let min_height = self.setup.font_size as f64 * self.setup.line_spacing;
            let content_heights: Vec<f64> = flowed
                .iter()
                .map(|paras| paras.iter().map(|f| f.height(self.setup)).sum::<f64>())
                .collect();
            let row_height = placed
                .iter()
                .zip(&content_heights)
                .map(|((cell, _, _), h)| h + 2.0 * cell.padding)
                .fold(min_height, f64::max);

            if !self.fits(row_height) && !self.at_page_top() {
                self.new_page();
            }

            let row_top = self.y;
            for (((cell, x, w), paras), content_height) in
                placed.iter().zip(&flowed).zip(&content_heights)
            {
                if let Some(shading) = cell.shading {
                    self.doc
                        .fill_rect(self.page, *x, row_top, *w, row_height, shading)?;
                }

                let offset = match cell.valign {
                    VAlign::Top => 0.0,
                    VAlign::Center => {
                        (row_height - 2.0 * cell.padding - content_height).max(0.0) / 2.0
                    }
                };
                self.y = row_top + cell.padding + offset;
                let inner_left = x + cell.padding;
                let inner_width = (w - 2.0 * cell.padding).max(0.0);

                for flowed_paragraph in paras {
                    self.y += flowed_paragraph.paragraph.spacing_before;
                    for line in &flowed_paragraph.lines {
                        self.draw_line(line, flowed_paragraph.paragraph, inner_left, inner_width)?;
                        self.y += line.height(self.setup);
                    }
                    self.y += flowed_paragraph.paragraph.spacing_after;
                }

                if table.bordered {
                    self.doc.stroke_rect(
                        self.page,
                        *x,
                        row_top,
                        *w,
                        row_height,
                        BORDER_WIDTH,
                        Color::black(),
                    )?;
                }
            }

            self.y = row_top + row_height;
        }

        Ok(())
    }
}
