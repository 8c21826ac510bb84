//! Raster images: data-URI decoding, XObject creation and placement
//!
//! Item photos arrive as data URIs. Only JPEG and PNG payloads are embedded:
//! JPEG bytes go into the PDF untouched, PNG pixels are flattened onto white
//! and Flate-compressed.

use crate::{DocError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::DynamicImage;
use lopdf::{dictionary, Stream};

impl From<image::ImageError> for DocError {
    fn from(err: image::ImageError) -> Self {
        DocError::ImageError(err.to_string())
    }
}

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Raster formats that can be embedded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Sniff the payload's leading bytes; the declared MIME type is not trusted
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.starts_with(PNG_MAGIC) {
        Ok(ImageFormat::Png)
    } else if data.starts_with(JPEG_MAGIC) && data.len() >= 4 {
        Ok(ImageFormat::Jpeg)
    } else {
        Err(DocError::ImageError(format!(
            "payload of {} bytes is neither JPEG nor PNG",
            data.len()
        )))
    }
}

/// Largest size with the image's aspect ratio that fits the box
///
/// A zero pixel dimension yields the box itself.
pub fn fit_within(px_width: u32, px_height: u32, box_width: f64, box_height: f64) -> (f64, f64) {
    if px_width == 0 || px_height == 0 {
        return (box_width, box_height);
    }
    let scale = (box_width / px_width as f64).min(box_height / px_height as f64);
    (px_width as f64 * scale, px_height as f64 * scale)
}

/// A decoded `data:` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Declared MIME type (e.g. "image/png")
    pub mime: String,
    /// Payload bytes
    pub data: Vec<u8>,
}

/// Decode a base64 `data:<mime>;base64,<payload>` URI
///
/// # Examples
/// ```
/// use doc_core::decode_data_uri;
/// let uri = decode_data_uri("data:image/png;base64,AAEC").unwrap();
/// assert_eq!(uri.mime, "image/png");
/// assert_eq!(uri.data, vec![0, 1, 2]);
/// ```
pub fn decode_data_uri(uri: &str) -> Result<DataUri> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| DocError::InvalidDataUri("missing data: scheme".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| DocError::InvalidDataUri("missing payload separator".to_string()))?;

    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| DocError::InvalidDataUri("payload is not base64".to_string()))?;

    if payload.is_empty() {
        return Err(DocError::InvalidDataUri("empty payload".to_string()));
    }

    let data = STANDARD
        .decode(payload.trim())
        .map_err(|e| DocError::InvalidDataUri(e.to_string()))?;

    Ok(DataUri {
        mime: mime.to_string(),
        data,
    })
}

/// Encode bytes as a base64 data URI
pub fn encode_data_uri(mime: &str, data: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(data))
}

/// PDF colour space of an embedded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
}

impl ColorSpace {
    pub fn pdf_name(self) -> &'static str {
        match self {
            ColorSpace::Gray => "DeviceGray",
            ColorSpace::Rgb => "DeviceRGB",
            ColorSpace::Cmyk => "DeviceCMYK",
        }
    }
}

/// How the XObject stream is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFilter {
    /// JPEG bytes as is
    Dct,
    /// zlib-compressed raw pixels
    Flate,
}

impl StreamFilter {
    pub fn pdf_name(self) -> &'static str {
        match self {
            StreamFilter::Dct => "DCTDecode",
            StreamFilter::Flate => "FlateDecode",
        }
    }
}

/// An image ready to be added as a `/XObject` (always 8 bits per component)
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub filter: StreamFilter,
    /// Encoded stream body
    pub data: Vec<u8>,
}

/// Frame header of a JPEG stream
struct JpegFrame {
    width: u32,
    height: u32,
    components: u8,
}

/// Walk the marker segments up to the first start-of-frame
fn jpeg_frame(data: &[u8]) -> Option<JpegFrame> {
    let mut rest = data.get(2..)?;
    loop {
        let at = rest.iter().position(|&b| b == 0xFF)?;
        rest = &rest[at..];
        let marker = *rest.get(1)?;
        match marker {
            // fill byte
            0xFF => rest = &rest[1..],
            // standalone markers carry no length
            0x01 | 0xD0..=0xD9 => rest = &rest[2..],
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                let frame = rest.get(5..10)?;
                return Some(JpegFrame {
                    height: u16::from_be_bytes([frame[0], frame[1]]) as u32,
                    width: u16::from_be_bytes([frame[2], frame[3]]) as u32,
                    components: frame[4],
                });
            }
            _ => {
                let length = u16::from_be_bytes([*rest.get(2)?, *rest.get(3)?]) as usize;
                if length < 2 {
                    return None;
                }
                rest = rest.get(2 + length..)?;
            }
        }
    }
}

impl ImageXObject {
    /// Build from JPEG or PNG bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match detect_format(data)? {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_png(data),
        }
    }

    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        let frame = jpeg_frame(data)
            .ok_or_else(|| DocError::ImageError("JPEG frame header not found".to_string()))?;
        if frame.width == 0 || frame.height == 0 {
            return Err(DocError::ImageError(format!(
                "JPEG frame is {}x{}",
                frame.width, frame.height
            )));
        }

        Ok(Self {
            width: frame.width,
            height: frame.height,
            color_space: match frame.components {
                1 => ColorSpace::Gray,
                4 => ColorSpace::Cmyk,
                _ => ColorSpace::Rgb,
            },
            filter: StreamFilter::Dct,
            data: data.to_vec(),
        })
    }

    /// Decode a PNG and flatten any transparency onto white
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory_with_format(data, image::ImageFormat::Png)?;
        let (width, height) = (image.width(), image.height());
        let (pixels, color_space) = flatten(&image);

        Ok(Self {
            width,
            height,
            color_space,
            filter: StreamFilter::Flate,
            data: crate::document::zlib_compress(&pixels)?,
        })
    }

    /// Stream object for the document's object table
    pub fn to_pdf_stream(&self) -> Stream {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => self.width as i64,
            "Height" => self.height as i64,
            "ColorSpace" => self.color_space.pdf_name(),
            "BitsPerComponent" => 8i64,
            "Filter" => self.filter.pdf_name(),
        };
        Stream::new(dict, self.data.clone())
    }
}

/// 8-bit pixels without alpha, plus their colour space
fn flatten(image: &DynamicImage) -> (Vec<u8>, ColorSpace) {
    let color = image.color();
    match (color.has_color(), color.has_alpha()) {
        (false, false) => (image.to_luma8().into_raw(), ColorSpace::Gray),
        (false, true) => {
            let gray = image
                .to_luma_alpha8()
                .pixels()
                .map(|p| over_white(p[0], p[1]))
                .collect();
            (gray, ColorSpace::Gray)
        }
        (true, true) => {
            let rgb = image
                .to_rgba8()
                .pixels()
                .flat_map(|p| [p[0], p[1], p[2]].map(|c| over_white(c, p[3])))
                .collect();
            (rgb, ColorSpace::Rgb)
        }
        (true, false) => (image.to_rgb8().into_raw(), ColorSpace::Rgb),
    }
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let a = alpha as f32 / 255.0;
    (channel as f32 * a + 255.0 * (1.0 - a)) as u8
}

/// `q ... cm /Im Do Q` placing an image resource with its lower-left corner at `(x, y)`
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tiny_png(pixel: image::Rgba<u8>) -> Vec<u8> {
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(4, 2, pixel))
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn opaque_png() -> Vec<u8> {
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(image::RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30])))
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn inflate(data: &[u8]) -> Vec<u8> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut raw = Vec::new();
        std::io::Read::read_to_end(&mut decoder, &mut raw).unwrap();
        raw
    }

    // SOI, APP0 (length 4), SOF0 100x200 with 3 components, EOI
    const SMALL_JPEG: &[u8] = &[
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x4A, 0x46, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x64,
        0x00, 0xC8, 0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01, 0xFF, 0xD9,
    ];

    #[test]
    fn test_detect_formats() {
        assert_eq!(detect_format(SMALL_JPEG).unwrap(), ImageFormat::Jpeg);
        assert_eq!(detect_format(&opaque_png()).unwrap(), ImageFormat::Png);

        let err = detect_format(b"GIF89a..").unwrap_err();
        assert_eq!(err.to_string(), "Image error: payload of 8 bytes is neither JPEG nor PNG");
        assert!(detect_format(&[0xFF, 0xD8]).is_err());
    }

    #[test]
    fn test_jpeg_frame_after_app_segment() {
        let xobject = ImageXObject::from_bytes(SMALL_JPEG).unwrap();
        assert_eq!((xobject.width, xobject.height), (200, 100));
        assert_eq!(xobject.filter, StreamFilter::Dct);
        assert_eq!(xobject.color_space, ColorSpace::Rgb);
        assert_eq!(xobject.data, SMALL_JPEG);
    }

    #[test]
    fn test_truncated_jpeg_fails() {
        let err = ImageXObject::from_bytes(&SMALL_JPEG[..12]).unwrap_err();
        assert!(err.to_string().contains("frame header not found"));
    }

    #[test]
    fn test_opaque_png_keeps_pixels() {
        let xobject = ImageXObject::from_bytes(&opaque_png()).unwrap();
        assert_eq!((xobject.width, xobject.height), (4, 2));
        assert_eq!(xobject.color_space, ColorSpace::Rgb);
        assert_eq!(xobject.filter, StreamFilter::Flate);
        assert_eq!(&inflate(&xobject.data)[..3], &[10, 20, 30]);
    }

    #[test]
    fn test_transparent_png_becomes_white() {
        let xobject = ImageXObject::from_png(&tiny_png(image::Rgba([255, 0, 0, 0]))).unwrap();
        let raw = inflate(&xobject.data);
        assert_eq!(raw.len(), 4 * 2 * 3);
        assert!(raw.iter().all(|&b| b == 255));
    }

    #[test]
    fn test_corrupt_png_fails() {
        let mut bogus = PNG_MAGIC.to_vec();
        bogus.extend_from_slice(b"not really a png");
        assert!(ImageXObject::from_bytes(&bogus).is_err());
    }

    #[test]
    fn test_pdf_stream_dictionary() {
        let xobject = ImageXObject {
            width: 100,
            height: 50,
            color_space: ColorSpace::Gray,
            filter: StreamFilter::Dct,
            data: vec![1, 2, 3, 4, 5],
        };

        let stream = xobject.to_pdf_stream();
        let dict = &stream.dict;
        assert_eq!(dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Image");
        assert_eq!(dict.get(b"Width").unwrap().as_i64().unwrap(), 100);
        assert_eq!(dict.get(b"ColorSpace").unwrap().as_name().unwrap(), b"DeviceGray");
        assert_eq!(dict.get(b"Filter").unwrap().as_name().unwrap(), b"DCTDecode");
        assert_eq!(stream.content, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_image_operators() {
        let ops = String::from_utf8(generate_image_operators("Im1", 100.0, 200.0, 50.0, 75.0)).unwrap();
        assert_eq!(ops, "q\n50 0 0 75 100 200 cm\n/Im1 Do\nQ\n");
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(800, 600, 100.0, 200.0), (100.0, 75.0));
        assert_eq!(fit_within(600, 800, 200.0, 100.0), (75.0, 100.0));
        assert_eq!(fit_within(0, 600, 100.0, 200.0), (100.0, 200.0));
    }

    #[test]
    fn test_data_uri_round_trip() {
        let uri = encode_data_uri("image/jpeg", &[0xFF, 0xD8, 0xFF]);
        assert_eq!(uri, "data:image/jpeg;base64,/9j/");

        let decoded = decode_data_uri(&uri).unwrap();
        assert_eq!(decoded.mime, "image/jpeg");
        assert_eq!(decoded.data, vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_data_uri_rejects_malformed() {
        assert!(decode_data_uri("image/png;base64,AAAA").is_err());
        assert!(decode_data_uri("data:image/png;base64").is_err());
        assert!(decode_data_uri("data:image/png,AAAA").is_err());
        assert!(decode_data_uri("data:image/png;base64,").is_err());
        assert!(decode_data_uri("data:image/png;base64,@@@@").is_err());
    }
}
