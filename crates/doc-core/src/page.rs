//! Page geometry

use serde::{Deserialize, Serialize};

/// A4 width in points
pub const A4_WIDTH: f64 = 595.28;

/// A4 height in points
pub const A4_HEIGHT: f64 = 841.89;

/// Page size, margins and default text settings
///
/// All lengths are in points. Every field has a default, so a partial JSON
/// object such as `{"font_size": 11}` is a valid setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    /// Default font size
    pub font_size: f32,
    /// Line height as a multiple of the font size
    pub line_spacing: f64,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margin_top: 36.0,
            margin_bottom: 36.0,
            margin_left: 72.0,
            margin_right: 72.0,
            font_size: 12.0,
            line_spacing: 1.15,
        }
    }
}

impl PageSetup {
    /// Width available between the side margins
    pub fn content_width(&self) -> f64 {
        (self.width - self.margin_left - self.margin_right).max(0.0)
    }

    /// Lowest y (from the top) that content may reach
    pub fn content_bottom(&self) -> f64 {
        self.height - self.margin_bottom
    }

    /// Parse a setup from JSON, filling omitted fields with defaults
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::DocError::InvalidPageSetup(e.to_string()))
    }
}
