//! PDF document writer
//!
//! Builds a fresh PDF page by page. Drawing calls take top-left based
//! coordinates and are buffered per page; objects are only written when the
//! document is serialized.

use crate::font::{encode_text_literal, font_resources, StandardFont, ALL_FONTS};
use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{Align, DocError, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::io::Write;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    pub fn red() -> Self {
        Self::rgb(1.0, 0.0, 0.0)
    }

    /// Light grey used for header shading
    pub fn light_gray() -> Self {
        Self::from_rgb(0xE0, 0xE0, 0xE0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// An image already turned into an XObject
#[derive(Debug, Clone)]
struct EmbeddedImage {
    resource_name: String,
    object_id: ObjectId,
    width: u32,
    height: u32,
}

/// Compress bytes with zlib (FlateDecode)
pub(crate) fn zlib_compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// A PDF under construction
pub struct PdfDocument {
    inner: Document,
    page_width: f64,
    page_height: f64,
    /// Content operators per page (index 0 = page 1)
    page_content: Vec<Vec<u8>>,
    /// Images keyed by a hash of their bytes
    embedded_images: HashMap<u64, EmbeddedImage>,
    next_image_resource: u32,
}

impl PdfDocument {
    /// Start an empty document with the given page size in points
    pub fn new(page_width: f64, page_height: f64) -> Self {
        Self {
            inner: Document::with_version("1.5"),
            page_width,
            page_height,
            page_content: Vec::new(),
            embedded_images: HashMap::new(),
            next_image_resource: 1,
        }
    }

    /// Number of pages added so far
    pub fn page_count(&self) -> usize {
        self.page_content.len()
    }

    /// Append a blank page
    ///
    /// # Returns
    /// New page number (1-indexed)
    pub fn add_blank_page(&mut self) -> usize {
        self.page_content.push(Vec::new());
        self.page_content.len()
    }

    fn buffer_content(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let count = self.page_content.len();
        let buffer = page
            .checked_sub(1)
            .and_then(|idx| self.page_content.get_mut(idx))
            .ok_or(DocError::InvalidPage(page, count))?;
        buffer.extend_from_slice(content);
        Ok(())
    }

    /// Insert one line of text
    ///
    /// # Arguments
    /// * `text` - Text to draw (no wrapping is done here)
    /// * `page` - Page number (1-indexed)
    /// * `x` - Anchor X in points from the left edge
    /// * `y` - Baseline Y in points from the top edge
    /// * `font` - Face to use
    /// * `font_size` - Size in points
    /// * `color` - Fill color
    /// * `align` - How the text sits relative to `x`
    #[allow(clippy::too_many_arguments)]
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        font: StandardFont,
        font_size: f32,
        color: Color,
        align: Align,
    ) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        let ctx = TextRenderContext {
            font_name: font.resource_name().to_string(),
            font_size,
            text_width: font.text_width_points(text, font_size),
            color,
        };

        let pdf_y = self.page_height - y;
        let ops = generate_text_operators(&encode_text_literal(text), x, pdf_y, align, &ctx);
        self.buffer_content(page, &ops)
    }

    /// Stroke a line between two top-left based points
    pub fn draw_line(
        &mut self,
        page: usize,
        from: (f64, f64),
        to: (f64, f64),
        width: f64,
        color: Color,
    ) -> Result<()> {
        let ops = format!(
            "q\n{} {} {} RG\n{width} w\n{} {} m\n{} {} l\nS\nQ\n",
            color.r,
            color.g,
            color.b,
            from.0,
            self.page_height - from.1,
            to.0,
            self.page_height - to.1
        );
        self.buffer_content(page, ops.as_bytes())
    }

    /// Fill a rectangle whose top-left corner is `(x, y)`
    pub fn fill_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    ) -> Result<()> {
        let ops = format!(
            "q\n{} {} {} rg\n{x} {} {width} {height} re\nf\nQ\n",
            color.r,
            color.g,
            color.b,
            self.page_height - y - height
        );
        self.buffer_content(page, ops.as_bytes())
    }

    /// Outline a rectangle whose top-left corner is `(x, y)`
    #[allow(clippy::too_many_arguments)]
    pub fn stroke_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        line_width: f64,
        color: Color,
    ) -> Result<()> {
        let ops = format!(
            "q\n{} {} {} RG\n{line_width} w\n{x} {} {width} {height} re\nS\nQ\n",
            color.r,
            color.g,
            color.b,
            self.page_height - y - height
        );
        self.buffer_content(page, ops.as_bytes())
    }

    /// Embed an image (once per distinct byte content) and return its pixel size
    pub fn register_image(&mut self, data: &[u8]) -> Result<(u32, u32)> {
        let image = self.get_or_create_image(data)?;
        Ok((image.width, image.height))
    }

    /// Draw an image with its top-left corner at `(x, y)`
    ///
    /// # Arguments
    /// * `data` - JPEG or PNG bytes
    /// * `page` - Page number (1-indexed)
    /// * `x`, `y` - Top-left corner in points from the top-left of the page
    /// * `width`, `height` - Drawn size in points
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        let image = self.get_or_create_image(data)?;
        let pdf_y = self.page_height - y - height;
        let ops = generate_image_operators(&image.resource_name, x, pdf_y, width, height);
        self.buffer_content(page, &ops)
    }

    fn get_or_create_image(&mut self, data: &[u8]) -> Result<EmbeddedImage> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        if let Some(existing) = self.embedded_images.get(&data_hash) {
            return Ok(existing.clone());
        }

        let xobject = ImageXObject::from_bytes(data)?;
        let object_id = self.inner.add_object(xobject.to_pdf_stream());

        let image = EmbeddedImage {
            resource_name: format!("Im{}", self.next_image_resource),
            object_id,
            width: xobject.width,
            height: xobject.height,
        };
        self.next_image_resource += 1;
        self.embedded_images.insert(data_hash, image.clone());

        Ok(image)
    }

    /// Serialize the document
    ///
    /// Writes fonts, a shared resource dictionary, compressed page contents,
    /// the page tree and the catalog. A document without pages gets one
    /// blank page.
    pub fn to_bytes(mut self) -> Result<Vec<u8>> {
        if self.page_content.is_empty() {
            self.add_blank_page();
        }

        let pages_id = self.inner.new_object_id();

        let font_ids: Vec<(StandardFont, ObjectId)> = ALL_FONTS
            .iter()
            .map(|font| (*font, self.inner.add_object(font.to_pdf_dictionary())))
            .collect();

        let mut xobjects = Dictionary::new();
        for image in self.embedded_images.values() {
            xobjects.set(
                image.resource_name.as_bytes(),
                Object::Reference(image.object_id),
            );
        }

        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(font_resources(&font_ids)));
        resources.set("XObject", Object::Dictionary(xobjects));
        let resources_id = self.inner.add_object(resources);

        let media_box = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(self.page_width as f32),
            Object::Real(self.page_height as f32),
        ];

        let mut kids = Vec::with_capacity(self.page_content.len());
        for content in std::mem::take(&mut self.page_content) {
            let mut stream_dict = Dictionary::new();
            stream_dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
            let stream = Stream::new(stream_dict, zlib_compress(&content)?);
            let contents_id = self.inner.add_object(stream);

            let page = Dictionary::from_iter(vec![
                ("Type", "Page".into()),
                ("Parent", Object::Reference(pages_id)),
                ("MediaBox", Object::Array(media_box.clone())),
                ("Resources", Object::Reference(resources_id)),
                ("Contents", Object::Reference(contents_id)),
            ]);
            kids.push(Object::Reference(self.inner.add_object(page)));
        }

        let count = kids.len() as i64;
        let pages = Dictionary::from_iter(vec![
            ("Type", "Pages".into()),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
        ]);
        self.inner
            .objects
            .insert(pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", "Catalog".into()),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = self.inner.add_object(catalog);
        self.inner.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| DocError::SaveError(e.to_string()))?;

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_rgb() {
        assert_eq!(Color::from_rgb(255, 0, 0), Color::red());
        assert_eq!(Color::default(), Color::black());
    }

    #[test]
    fn test_pages_are_one_indexed() {
        let mut doc = PdfDocument::new(595.28, 841.89);
        assert_eq!(doc.add_blank_page(), 1);
        assert_eq!(doc.add_blank_page(), 2);
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn test_invalid_page() {
        let mut doc = PdfDocument::new(595.28, 841.89);
        doc.add_blank_page();
        let err = doc
            .insert_text(
                "x",
                3,
                0.0,
                0.0,
                StandardFont::TimesRoman,
                12.0,
                Color::black(),
                Align::Left,
            )
            .unwrap_err();
        assert!(matches!(err, DocError::InvalidPage(3, 1)));
    }

    #[test]
    fn test_empty_document_gets_a_page() {
        let bytes = PdfDocument::new(595.28, 841.89).to_bytes().unwrap();
        let parsed = Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 1);
    }

    #[test]
    fn test_text_flipped_to_pdf_coordinates() {
        let mut doc = PdfDocument::new(600.0, 800.0);
        doc.add_blank_page();
        doc.insert_text(
            "Halo",
            1,
            100.0,
            50.0,
            StandardFont::TimesBold,
            12.0,
            Color::black(),
            Align::Left,
        )
        .unwrap();

        let content = String::from_utf8(doc.page_content[0].clone()).unwrap();
        assert!(content.contains("/F2 12 Tf"));
        assert!(content.contains("100 750 Td"));
        assert!(content.contains("(Halo) Tj"));
    }

    #[test]
    fn test_invalid_image_is_an_error() {
        let mut doc = PdfDocument::new(600.0, 800.0);
        doc.add_blank_page();
        assert!(doc.register_image(b"definitely not an image").is_err());
        assert!(doc.embedded_images.is_empty());
    }

    #[test]
    fn test_zlib_round_trip() {
        let compressed = zlib_compress(b"BT ET").unwrap();
        let mut decoder = flate2::read::ZlibDecoder::new(compressed.as_slice());
        let mut out = Vec::new();
        std::io::Read::read_to_end(&mut decoder, &mut out).unwrap();
        assert_eq!(out, b"BT ET");
    }
}
