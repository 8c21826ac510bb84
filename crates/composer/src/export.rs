//! Record export
//!
//! [`Exporter`] runs the whole pipeline for one record: totals, composition,
//! lowering to a render tree and serialization through the installed
//! [`RenderBackend`].

use crate::composer::{ComposeContext, Composer, LogoSource};
use crate::model::Record;
use crate::renderer::DocumentRenderer;
use crate::totals::Totals;
use crate::variant::VariantConfig;
use crate::{ComposeError, Result};
use chrono::NaiveDate;
use doc_core::{PageSetup, PdfBackend, RenderBackend};
use log::debug;

/// Characters replaced when deriving file names
pub const UNSAFE_FILE_NAME_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Replace filesystem-unsafe characters with `_`
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if UNSAFE_FILE_NAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// A produced document ready for download
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    /// File name with extension
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Turns records into downloadable documents
#[derive(Default)]
pub struct Exporter {
    backend: Option<Box<dyn RenderBackend>>,
    page: PageSetup,
    logo: Option<Box<dyn LogoSource>>,
}

impl Exporter {
    /// Exporter without a backend; exports fail until one is set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(backend: impl RenderBackend + 'static) -> Self {
        Self {
            backend: Some(Box::new(backend)),
            ..Self::default()
        }
    }

    /// Exporter using the built-in PDF backend
    pub fn pdf() -> Self {
        Self::with_backend(PdfBackend::new())
    }

    pub fn set_backend(&mut self, backend: impl RenderBackend + 'static) {
        self.backend = Some(Box::new(backend));
    }

    pub fn set_logo(&mut self, logo: impl LogoSource + 'static) {
        self.logo = Some(Box::new(logo));
    }

    pub fn with_logo(mut self, logo: impl LogoSource + 'static) -> Self {
        self.set_logo(logo);
        self
    }

    pub fn page_setup(mut self, page: PageSetup) -> Self {
        self.page = page;
        self
    }

    /// Export one record with a variant
    ///
    /// # Arguments
    /// * `record` - Record to render
    /// * `variant` - Document layout
    /// * `today` - Date used when the record has none
    pub fn export(
        &self,
        record: &Record,
        variant: &VariantConfig,
        today: NaiveDate,
    ) -> Result<ExportedFile> {
        let backend = self
            .backend
            .as_ref()
            .ok_or(ComposeError::BackendUnavailable)?;

        let totals = Totals::compute(&record.items, variant.price_convention);
        let mut ctx = ComposeContext::new(today);
        if let Some(logo) = self.logo.as_deref() {
            ctx = ctx.with_logo(logo);
        }

        let composer = Composer::new(variant);
        let document = composer.compose(record, &totals, &ctx);
        let tree = DocumentRenderer::new(&document).to_tree();
        let bytes = backend.render(&tree, &self.page)?;

        let file_name = format!(
            "{}.{}",
            composer.file_name(record, today),
            backend.file_extension()
        );
        debug!("exported {} ({} bytes)", file_name, bytes.len());

        Ok(ExportedFile {
            file_name,
            mime_type: backend.mime_type().to_string(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_core::DocTree;
    use pretty_assertions::assert_eq;

    struct TextBackend;

    impl RenderBackend for TextBackend {
        fn render(&self, tree: &DocTree, _setup: &PageSetup) -> doc_core::Result<Vec<u8>> {
            Ok(tree.plain_text().join("\n").into_bytes())
        }

        fn file_extension(&self) -> &'static str {
            "txt"
        }

        fn mime_type(&self) -> &'static str {
            "text/plain"
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name(r#"a\b/c:d*e?f"g<h>i|j"#), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_file_name("BAP_Laptop 2025"), "BAP_Laptop 2025");
    }

    #[test]
    fn test_backend_unavailable() {
        let variant = VariantConfig::preset("bast").unwrap();
        let err = Exporter::new()
            .export(&Record::default(), &variant, today())
            .unwrap_err();
        assert!(matches!(err, ComposeError::BackendUnavailable));

        let mut exporter = Exporter::new();
        exporter.set_backend(TextBackend);
        assert!(exporter.export(&Record::default(), &variant, today()).is_ok());
    }

    #[test]
    fn test_export_with_custom_backend() {
        let variant = VariantConfig::preset("nota-dinas").unwrap();
        let record = Record {
            reference_number: "ND/01".to_string(),
            ..Record::default()
        };
        let file = Exporter::with_backend(TextBackend)
            .export(&record, &variant, today())
            .unwrap();

        assert_eq!(file.file_name, "NOTA_DINAS_ND_01.txt");
        assert_eq!(file.mime_type, "text/plain");
        let text = String::from_utf8(file.bytes).unwrap();
        assert!(text.contains("NOTA DINAS"));
        assert!(text.contains("LOGO"));
    }
}
