//! Standard Times font family with WinAnsi encoding
//!
//! Documents are set in the PDF base-14 Times faces, so nothing is embedded:
//! each face only needs a resource name, its PostScript name and a width
//! table for line breaking.

use lopdf::{Dictionary, Object};

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Font style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// One face of the Times family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StandardFont {
    #[default]
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
}

/// Every face, in resource order (F1..F4)
pub const ALL_FONTS: [StandardFont; 4] = [
    StandardFont::TimesRoman,
    StandardFont::TimesBold,
    StandardFont::TimesItalic,
    StandardFont::TimesBoldItalic,
];

// Advance widths (1/1000 em) for WinAnsi 32..=126, from the Adobe AFM files.
#[rustfmt::skip]
const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

#[rustfmt::skip]
const TIMES_ITALIC_WIDTHS: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500,
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500,
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500,
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_ITALIC_WIDTHS: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    832, 667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889, 722, 722,
    611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611, 333, 278, 333, 570, 500,
    333, 500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778, 556, 500,
    500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389, 348, 220, 348, 570,
];

/// Width used for glyphs outside the ASCII table
const FALLBACK_WIDTH: u16 = 500;

impl StandardFont {
    /// Pick the face for a weight/style combination
    pub fn select(weight: FontWeight, style: FontStyle) -> Self {
        match (weight, style) {
            (FontWeight::Regular, FontStyle::Normal) => StandardFont::TimesRoman,
            (FontWeight::Bold, FontStyle::Normal) => StandardFont::TimesBold,
            (FontWeight::Regular, FontStyle::Italic) => StandardFont::TimesItalic,
            (FontWeight::Bold, FontStyle::Italic) => StandardFont::TimesBoldItalic,
        }
    }

    /// Face for a bold/italic flag pair
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        let weight = if bold {
            FontWeight::Bold
        } else {
            FontWeight::Regular
        };
        let style = if italic {
            FontStyle::Italic
        } else {
            FontStyle::Normal
        };
        Self::select(weight, style)
    }

    /// PostScript name of the base-14 face
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
        }
    }

    /// Page resource name (e.g. "F1")
    pub fn resource_name(&self) -> &'static str {
        match self {
            StandardFont::TimesRoman => "F1",
            StandardFont::TimesBold => "F2",
            StandardFont::TimesItalic => "F3",
            StandardFont::TimesBoldItalic => "F4",
        }
    }

    fn widths(&self) -> &'static [u16; 95] {
        match self {
            StandardFont::TimesRoman => &TIMES_ROMAN_WIDTHS,
            StandardFont::TimesBold => &TIMES_BOLD_WIDTHS,
            StandardFont::TimesItalic => &TIMES_ITALIC_WIDTHS,
            StandardFont::TimesBoldItalic => &TIMES_BOLD_ITALIC_WIDTHS,
        }
    }

    /// Advance width of one WinAnsi byte in 1/1000 em
    pub fn glyph_advance(&self, byte: u8) -> u16 {
        match byte {
            32..=126 => self.widths()[(byte - 32) as usize],
            // NBSP measures like a space
            0xA0 => self.widths()[0],
            _ => FALLBACK_WIDTH,
        }
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f64 {
        let units: u32 = encode_win_ansi(text)
            .into_iter()
            .map(|b| self.glyph_advance(b) as u32)
            .sum();
        units as f64 / 1000.0 * font_size as f64
    }

    /// Font dictionary for the page resources
    pub fn to_pdf_dictionary(&self) -> Dictionary {
        Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type1".into()),
            ("BaseFont", self.base_font().into()),
            ("Encoding", "WinAnsiEncoding".into()),
        ])
    }
}

/// Encode text into WinAnsi (CP1252) bytes
///
/// Latin-1 maps straight through; the common typographic punctuation is mapped
/// to its CP1252 slot. Tabs become spaces and anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .map(|c| match c {
            '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Encode text as a PDF literal string for the Tj operator
///
/// Parentheses and backslashes are escaped; bytes above 0x7E are written as
/// octal escapes so the content stream stays ASCII.
pub fn encode_text_literal(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 2);
    result.push('(');
    for byte in encode_win_ansi(text) {
        match byte {
            b'(' | b')' | b'\\' => {
                result.push('\\');
                result.push(byte as char);
            }
            0x20..=0x7E => result.push(byte as char),
            _ => result.push_str(&format!("\\{byte:03o}")),
        }
    }
    result.push(')');
    result
}

/// Build the `/Font` resource dictionary referencing every face
pub fn font_resources(ids: &[(StandardFont, lopdf::ObjectId)]) -> Dictionary {
    let mut dict = Dictionary::new();
    for (font, id) in ids {
        dict.set(font.resource_name(), Object::Reference(*id));
    }
    dict
}
