//! Glyph-run extraction.
//!
//! Turns the raw text items of a page into [`GlyphRun`]s in top-down page
//! space. Runs come out in content-stream emission order, which is not
//! reading order; the layout module sorts them.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::source::{RawTextItem, SourcePage};

/// Font size used when the transform carries no usable scale.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Per-character width estimate (× font size) for items without a width.
pub const ESTIMATED_CHAR_WIDTH: f32 = 0.5;

/// How raw items are turned into runs for a given consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractProfile {
    /// Plain-text output: coordinates rounded to whole units, missing
    /// widths treated as 0.
    Text,
    /// Word output: exact coordinates, missing widths estimated from the
    /// font size and string length.
    Word,
}

/// A positioned string of text with shared font metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphRun {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position, measured from the top of the page
    pub y: f32,
    /// Advance width
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font name suggests a bold face
    pub is_bold: bool,
    /// Whether the font name suggests an italic face
    pub is_italic: bool,
}

impl GlyphRun {
    /// Create a run directly in top-down page space.
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            font_size,
            font_name: String::new(),
            is_bold: false,
            is_italic: false,
        }
    }

    /// Set the font name and derive bold/italic from it.
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        let (is_bold, is_italic) = font_style(&self.font_name);
        self.is_bold = is_bold;
        self.is_italic = is_italic;
        self
    }

    /// Convert a raw item from a page of the given height.
    pub fn from_raw(item: RawTextItem, page_height: f32, profile: ExtractProfile) -> Self {
        let font_size = font_size_from_transform(&item.transform);
        let (is_bold, is_italic) = font_style(&item.font_name);

        let mut x = item.transform[4];
        let mut y = page_height - item.transform[5];
        let width = match (item.width, profile) {
            (Some(width), _) if width > 0.0 => width,
            (_, ExtractProfile::Text) => 0.0,
            (_, ExtractProfile::Word) => {
                font_size * item.text.chars().count() as f32 * ESTIMATED_CHAR_WIDTH
            }
        };

        if profile == ExtractProfile::Text {
            x = x.round();
            y = y.round();
        }

        Self {
            text: item.text,
            x,
            y,
            width,
            font_size,
            font_name: item.font_name,
            is_bold,
            is_italic,
        }
    }

    /// Right edge of the run.
    pub fn end_x(&self) -> f32 {
        self.x + self.width
    }
}

/// Derive a font size from a text rendering matrix.
pub fn font_size_from_transform(transform: &[f32; 6]) -> f32 {
    let size = transform[0].abs().max(transform[3].abs());
    if size > 0.0 && size.is_finite() {
        size
    } else {
        DEFAULT_FONT_SIZE
    }
}

/// Infer (bold, italic) from a font name.
///
/// Substring matching on names is all the extraction API offers; subset
/// and embedded fonts often carry opaque names and will read as regular.
pub fn font_style(font_name: &str) -> (bool, bool) {
    let lower = font_name.to_lowercase();
    let is_bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
    let is_italic = lower.contains("italic") || lower.contains("oblique");
    (is_bold, is_italic)
}

/// Extract the glyph runs of a page, dropping empty strings.
pub fn extract_runs(page: &dyn SourcePage, profile: ExtractProfile) -> Result<Vec<GlyphRun>> {
    let height = page.size().height;
    let runs = page
        .text_items()?
        .into_iter()
        .filter(|item| !item.text.is_empty())
        .map(|item| GlyphRun::from_raw(item, height, profile))
        .collect();
    Ok(runs)
}
