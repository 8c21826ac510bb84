//! Rendering backends turn a [`DocTree`] into a downloadable file

use crate::{DocTree, PageSetup, Result};

/// Produces a binary document from a tree
pub trait RenderBackend {
    /// Render the tree with the given page geometry
    fn render(&self, tree: &DocTree, setup: &PageSetup) -> Result<Vec<u8>>;

    /// File extension without the dot (e.g. "pdf")
    fn file_extension(&self) -> &'static str;

    /// MIME type of the produced bytes
    fn mime_type(&self) -> &'static str;
}

impl<T: RenderBackend + ?Sized> RenderBackend for Box<T> {
    fn render(&self, tree: &DocTree, setup: &PageSetup) -> Result<Vec<u8>> {
        (**self).render(tree, setup)
    }

    fn file_extension(&self) -> &'static str {
        (**self).file_extension()
    }

    fn mime_type(&self) -> &'static str {
        (**self).mime_type()
    }
}
