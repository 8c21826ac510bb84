//! Integration tests for record composition and export

use chrono::NaiveDate;
use composer::{
    AppendixEntry, Block, ComposeContext, ComposeError, Composer, Exporter, Record, StaticLogo,
    Totals, VariantConfig,
};
use doc_core::{encode_data_uri, Node};
use lopdf::Document;
use pretty_assertions::assert_eq;
use serde_json::json;

fn create_test_png(color: [u8; 3]) -> Vec<u8> {
    use image::{ImageBuffer, Rgb};

    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(8, 6, Rgb(color));
    let mut buffer = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut buffer),
        image::ImageFormat::Png,
    )
    .expect("Failed to create PNG");
    buffer
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

/// A record as the legacy entry form stored it
fn legacy_record() -> Record {
    let red = encode_data_uri("image/png", &create_test_png([200, 0, 0]));
    let blue = encode_data_uri("image/png", &create_test_png([0, 0, 200]));

    Record::from_value(&json!({
        "id": 7,
        "NOS": "000.2.1.1/938/1.07.06/2025",
        "TGL": "2025-01-05",
        "PIHAK1": "KUSUMA ATMADJA, S.Sos",
        "NIP1": "197001021993021003",
        "JenBel": "Belanja Modal",
        "Deskripsi": "Laptop: Kantor",
        "NOBAP": "027/BAP/2025",
        "items": [
            {
                "Uraian": "Laptop ASUS\nRAM 16 GB",
                "Jumlah": "2",
                "HrgItem": "Rp 1.000,00",
                "PPN": 100,
                "Image": red,
                "Image2": blue
            },
            { "NamaBarang": "Kursi", "Hrgsbl": 500, "Image2": "data:text/plain;base64,aGFsbw==" },
            { "Uraian": "Meja" }
        ]
    }))
    .unwrap()
}

fn compose(record: &Record, key: &str) -> composer::Document {
    let variant = VariantConfig::preset(key).unwrap();
    let totals = Totals::compute(&record.items, variant.price_convention);
    Composer::new(&variant).compose(record, &totals, &ComposeContext::new(today()))
}

#[test]
fn test_totals_from_legacy_record() {
    let record = legacy_record();
    let totals = Totals::compute(&record.items, Default::default());

    assert_eq!(totals.pre_tax, 1500.0);
    assert_eq!(totals.tax, 100.0);
    assert_eq!(totals.post_tax, 1700.0);
    assert_eq!(totals.grand_total, 1700);
    assert_eq!(totals.in_words, "Seribu Tujuh Ratus Rupiah");
}

#[test]
fn test_appendix_matches_image_slots() {
    let record = legacy_record();
    assert_eq!(record.image_count(), 3);

    for key in VariantConfig::preset_keys() {
        let doc = compose(&record, key);
        let appendix = doc.appendix().expect("appendix present");
        assert_eq!(appendix.entries.len(), record.image_count());

        assert!(matches!(appendix.entries[0], AppendixEntry::Image { .. }));
        assert!(matches!(appendix.entries[1], AppendixEntry::Image { .. }));
        assert!(matches!(appendix.entries[2], AppendixEntry::Placeholder { .. }));

        let appendices = doc
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::ImageAppendix(_)))
            .count();
        assert_eq!(appendices, 1);
    }
}

#[test]
fn test_no_images_means_no_appendix_node() {
    let mut record = legacy_record();
    for item in &mut record.items {
        item.images = [None, None];
    }
    let doc = compose(&record, "bast");
    assert!(doc.appendix().is_none());

    let tree = composer::DocumentRenderer::new(&doc).to_tree();
    assert!(tree.images().is_empty());
}

#[test]
fn test_every_preset_exports_pdf() {
    let record = legacy_record();
    let exporter = Exporter::pdf().with_logo(StaticLogo(create_test_png([0, 120, 0])));

    for key in VariantConfig::preset_keys() {
        let variant = VariantConfig::preset(key).unwrap();
        let file = exporter.export(&record, &variant, today()).unwrap();

        assert_eq!(file.mime_type, "application/pdf");
        assert!(file.file_name.ends_with(".pdf"));
        assert!(!file.file_name.contains(['/', ':']));

        let pdf = Document::load_mem(&file.bytes).expect("output is not a readable PDF");
        // main body plus the documentation page at least
        assert!(pdf.get_pages().len() >= 2, "{} has too few pages", key);
    }
}

#[test]
fn test_bast_pdf_contents() {
    let record = legacy_record();
    let variant = VariantConfig::preset("bast").unwrap();
    let file = Exporter::pdf().export(&record, &variant, today()).unwrap();

    assert_eq!(file.file_name, "BAP_Laptop_ Kantor.pdf");

    let pdf = Document::load_mem(&file.bytes).unwrap();
    let text: String = pdf
        .get_pages()
        .values()
        .map(|id| String::from_utf8_lossy(&pdf.get_page_content(*id).unwrap()).into_owned())
        .collect();

    assert!(text.contains("(BERITA ACARA PENYERAHAN BARANG/JASA) Tj"));
    assert!(text.contains("(TERBILANG : Seribu Tujuh Ratus Rupiah) Tj"));
    assert!(text.contains("(Dokumentasi) Tj"));
    assert!(text.contains("(Gambar 1) Tj"));
    assert!(text.contains("([Format tidak valid: Gambar 3]) Tj"));
}

#[test]
fn test_missing_backend_produces_nothing() {
    let record = legacy_record();
    let variant = VariantConfig::preset("tanda-terima").unwrap();
    let result = Exporter::new().export(&record, &variant, today());
    assert!(matches!(result, Err(ComposeError::BackendUnavailable)));
}

#[test]
fn test_failed_logo_still_exports() {
    let record = legacy_record();
    let variant = VariantConfig::preset("tanda-terima").unwrap();
    let exporter = Exporter::pdf().with_logo(|| -> composer::Result<Vec<u8>> {
        Err(ComposeError::LogoUnavailable("404 Not Found".to_string()))
    });

    let file = exporter.export(&record, &variant, today()).unwrap();
    let pdf = Document::load_mem(&file.bytes).unwrap();
    let first = *pdf.get_pages().values().next().unwrap();
    let content = String::from_utf8_lossy(&pdf.get_page_content(first).unwrap()).into_owned();
    assert!(content.contains("(LOGO) Tj"));
}

#[test]
fn test_nota_dinas_per_unit_totals() {
    let record = Record::from_value(&json!({
        "NOS": "ND/01",
        "PIHAK1": "kepala upt",
        "SEKSI": "tata usaha",
        "ITEMS": [
            { "namaBarang": "Kertas HVS", "jumlah": 4, "hargaPerItem": "45.000,00", "satuan": "Rim" },
            { "namaBarang": "Pulpen", "jumlah": 0, "hargaPerItem": 2500 }
        ]
    }))
    .unwrap();

    let doc = compose(&record, "nota-dinas");
    let table = doc.item_tables().next().unwrap();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.text()).collect())
        .collect();

    assert_eq!(
        rows,
        vec![
            vec!["1", "Kertas Hvs", "4 Rim", "Rp 45.000", "Rp 180.000"],
            vec!["2", "Pulpen", "1 Pcs", "Rp 2.500", "Rp 2.500"],
        ]
    );
    assert_eq!(table.total.as_ref().unwrap().amount, "Rp 182.500");
}

#[test]
fn test_tree_keeps_block_order() {
    let doc = compose(&legacy_record(), "bast");
    let tree = composer::DocumentRenderer::new(&doc).to_tree();

    let breaks = tree.nodes.iter().filter(|n| **n == Node::PageBreak).count();
    // attachment page and documentation page
    assert_eq!(breaks, 2);
    assert_eq!(tree.images().len(), 2);
    assert_eq!(tree.plain_text()[0], "BERITA ACARA PENYERAHAN BARANG/JASA\nNomor : 000.2.1.1/938/1.07.06/2025");
}

#[test]
fn test_invalid_record_shape() {
    let err = Record::from_json("[1, 2]").unwrap_err();
    assert!(matches!(err, ComposeError::InvalidRecord(_)));
    assert!(matches!(Record::from_json("{"), Err(ComposeError::Json(_))));
}
