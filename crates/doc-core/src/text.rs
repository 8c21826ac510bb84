//! Text rendering utilities

use crate::document::Color;
use crate::Align;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text width in points (for alignment)
    pub text_width: f64,
    /// Text color (RGB)
    pub color: Color,
}

/// Calculate X offset for a line inside a container
///
/// Justified text is laid out flush left.
///
/// # Arguments
/// * `text_width` - Width of text in points
/// * `container_width` - Available width for alignment
/// * `align` - Desired alignment
pub fn calculate_x_offset(text_width: f64, container_width: f64, align: Align) -> f64 {
    match align {
        Align::Left | Align::Justify => 0.0,
        Align::Center => ((container_width - text_width) / 2.0).max(0.0),
        Align::Right => (container_width - text_width).max(0.0),
    }
}

/// Generate PDF operators for text insertion
///
/// Creates the PDF text operators (BT, rg, Tf, Td, Tj, ET) to render one
/// line of text anchored at `x`.
///
/// # Arguments
/// * `text_literal` - Encoded PDF string (e.g., "(Nomor)")
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Y coordinate in points (PDF coordinates, from bottom)
/// * `align` - Which side of the text sits on `x`
/// * `ctx` - Text rendering context
pub fn generate_text_operators(
    text_literal: &str,
    x: f64,
    y: f64,
    align: Align,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let x_offset = match align {
        Align::Left | Align::Justify => 0.0,
        Align::Center => -ctx.text_width / 2.0,
        Align::Right => -ctx.text_width,
    };

    let final_x = x + x_offset;

    let mut ops = String::new();
    ops.push_str("BT\n");
    ops.push_str(&format!(
        "{} {} {} rg\n",
        ctx.color.r, ctx.color.g, ctx.color.b
    ));
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, ctx.font_size));
    ops.push_str(&format!("{final_x} {y} Td\n"));
    ops.push_str(&format!("{text_literal} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

/// Split text into lines that fit a width
///
/// Breaks on whitespace. A word longer than the width gets a line of its own
/// rather than being split.
///
/// # Arguments
/// * `text` - Text to split
/// * `max_width` - Available width in points
/// * `measure` - Width of a string in points
pub fn wrap_to_width<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
            continue;
        }

        let candidate = format!("{current_line} {word}");
        if measure(&candidate) <= max_width {
            current_line = candidate;
        } else {
            lines.push(std::mem::replace(&mut current_line, word.to_string()));
        }
    }

    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One point per character
    fn chars(s: &str) -> f64 {
        s.chars().count() as f64
    }

    #[test]
    fn test_x_offset() {
        assert_eq!(calculate_x_offset(100.0, 500.0, Align::Left), 0.0);
        assert_eq!(calculate_x_offset(100.0, 500.0, Align::Center), 200.0);
        assert_eq!(calculate_x_offset(100.0, 500.0, Align::Right), 400.0);
        assert_eq!(calculate_x_offset(100.0, 500.0, Align::Justify), 0.0);
    }

    #[test]
    fn test_x_offset_overflow_clamped() {
        assert_eq!(calculate_x_offset(600.0, 500.0, Align::Center), 0.0);
        assert_eq!(calculate_x_offset(600.0, 500.0, Align::Right), 0.0);
    }

    #[test]
    fn test_generate_text_operators_left() {
        let ctx = TextRenderContext {
            font_name: "F1".to_string(),
            font_size: 12.0,
            text_width: 100.0,
            color: Color::black(),
        };

        let ops = generate_text_operators("(Nomor)", 100.0, 700.0, Align::Left, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.starts_with("BT\n"));
        assert!(ops_str.contains("0 0 0 rg"));
        assert!(ops_str.contains("/F1 12 Tf"));
        assert!(ops_str.contains("100 700 Td"));
        assert!(ops_str.contains("(Nomor) Tj"));
        assert!(ops_str.ends_with("ET\n"));
    }

    #[test]
    fn test_generate_text_operators_center_and_right() {
        let ctx = TextRenderContext {
            font_name: "F2".to_string(),
            font_size: 14.0,
            text_width: 100.0,
            color: Color::red(),
        };

        let center = String::from_utf8(generate_text_operators(
            "(a)",
            200.0,
            600.0,
            Align::Center,
            &ctx,
        ))
        .unwrap();
        assert!(center.contains("150 600 Td"));
        assert!(center.contains("1 0 0 rg"));

        let right = String::from_utf8(generate_text_operators(
            "(a)",
            300.0,
            500.0,
            Align::Right,
            &ctx,
        ))
        .unwrap();
        assert!(right.contains("200 500 Td"));
    }

    #[test]
    fn test_wrap_to_width() {
        let lines = wrap_to_width("Hello world this is a test", 12.0, chars);
        assert_eq!(lines, vec!["Hello world", "this is a", "test"]);
    }

    #[test]
    fn test_wrap_exact_fit_and_just_over() {
        assert_eq!(wrap_to_width("Hello world", 11.0, chars), vec!["Hello world"]);
        assert_eq!(wrap_to_width("Hello world", 10.0, chars), vec!["Hello", "world"]);
    }

    #[test]
    fn test_wrap_long_word_kept_whole() {
        let lines = wrap_to_width("Supercalifragilisticexpialidocious", 10.0, chars);
        assert_eq!(lines, vec!["Supercalifragilisticexpialidocious"]);
    }

    #[test]
    fn test_wrap_empty_and_whitespace() {
        assert_eq!(wrap_to_width("", 10.0, chars), vec![""]);
        assert_eq!(wrap_to_width("   ", 10.0, chars), vec![""]);
    }

    #[test]
    fn test_wrap_collapses_spaces() {
        assert_eq!(wrap_to_width("Hello    world", 20.0, chars), vec!["Hello world"]);
    }
}
