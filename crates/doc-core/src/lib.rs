//! Doc Core - document tree and rendering backends
//!
//! This crate provides functionality for:
//! - Describing a document as a tree of paragraphs, tables and images
//! - Page geometry (size, margins, default font size, line spacing)
//! - Rendering the tree to PDF with the standard Times fonts
//! - Decoding data-URI images and embedding JPEG/PNG
//!
//! # Example
//!
//! ```
//! use doc_core::{Align, DocTree, Node, PageSetup, Paragraph, PdfBackend, RenderBackend, TextRun};
//!
//! let mut tree = DocTree::new();
//! tree.push(Node::Paragraph(
//!     Paragraph::new()
//!         .run(TextRun::new("BERITA ACARA").bold().underline())
//!         .align(Align::Center),
//! ));
//!
//! let pdf = PdfBackend::new().render(&tree, &PageSetup::default()).unwrap();
//! assert!(pdf.starts_with(b"%PDF"));
//! ```

mod backend;
mod document;
mod font;
mod image;
mod layout;
mod page;
mod text;
mod tree;

pub use backend::RenderBackend;
pub use document::{Color, PdfDocument};
pub use font::{encode_text_literal, encode_win_ansi, FontStyle, FontWeight, StandardFont};
pub use image::{
    decode_data_uri, detect_format, encode_data_uri, fit_within, ColorSpace, DataUri, ImageFormat,
    ImageXObject, StreamFilter,
};
pub use layout::PdfBackend;
pub use page::{PageSetup, A4_HEIGHT, A4_WIDTH};
pub use text::{calculate_x_offset, generate_text_operators, wrap_to_width, TextRenderContext};
pub use tree::{Cell, DocTree, ImageRun, Node, Paragraph, Row, Run, Table, TextRun, VAlign};

use thiserror::Error;

/// Errors that can occur while building or rendering documents
#[derive(Debug, Error)]
pub enum DocError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("Invalid page setup: {0}")]
    InvalidPageSetup(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for document operations
pub type Result<T> = std::result::Result<T, DocError>;

/// Horizontal alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    /// Laid out flush left by the PDF backend
    Justify,
}
