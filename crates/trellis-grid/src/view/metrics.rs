//! Text measurement boundary.
//!
//! Width resolution needs measured text extents, but font rasterization
//! belongs to the host. The engine only consumes this trait; tests use
//! [`FixedAdvanceMeasurer`] for deterministic geometry.

use trellis_core::geometry::Size;

/// A font descriptor handed to the host's measurement service.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
    pub bold: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size: 14.0,
            bold: false,
        }
    }
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
        }
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }
}

/// Measures text extents for width resolution and header sizing.
pub trait TextMeasurer: Send + Sync {
    /// The width and height of `text` rendered in `font`.
    fn measure(&self, text: &str, font: &FontSpec) -> Size;
}

/// Deterministic measurer: every character advances by a fixed amount.
///
/// Keeps layout tests independent of any font stack.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceMeasurer {
    pub advance: f32,
    pub line_height: f32,
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self {
            advance: 8.0,
            line_height: 16.0,
        }
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure(&self, text: &str, _font: &FontSpec) -> Size {
        Size::new(text.chars().count() as f32 * self.advance, self.line_height)
    }
}
