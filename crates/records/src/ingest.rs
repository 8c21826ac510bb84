//! Image upload ingestion

use crate::{RecordsError, Result};
use doc_core::encode_data_uri;

/// Largest accepted upload (5 MiB)
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Turn an uploaded file into a data URI for an item image slot
///
/// # Arguments
/// * `bytes` - File contents
/// * `mime` - MIME type reported for the file; must be `image/*`
pub fn ingest_image(bytes: &[u8], mime: &str) -> Result<String> {
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(RecordsError::ImageTooLarge(bytes.len()));
    }
    let mime = mime.trim().to_ascii_lowercase();
    if !mime.starts_with("image/") {
        return Err(RecordsError::NotAnImage(mime));
    }
    Ok(encode_data_uri(&mime, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ingest_png() {
        let uri = ingest_image(&[0x89, b'P', b'N', b'G'], "image/png").unwrap();
        assert_eq!(uri, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_rejects_large_files() {
        let bytes = vec![0u8; MAX_IMAGE_BYTES + 1];
        assert!(matches!(
            ingest_image(&bytes, "image/jpeg"),
            Err(RecordsError::ImageTooLarge(n)) if n == MAX_IMAGE_BYTES + 1
        ));
        assert!(ingest_image(&bytes[..MAX_IMAGE_BYTES], "image/jpeg").is_ok());
    }

    #[test]
    fn test_rejects_non_images() {
        let err = ingest_image(b"%PDF", "application/pdf").unwrap_err();
        assert_eq!(err.to_string(), "File harus berupa gambar! (application/pdf)");
    }
}
