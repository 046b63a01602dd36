//! Page source abstraction layer.
//!
//! Provides a trait-based interface to the PDF library, isolating the
//! concrete backend (pdfium) from extraction, layout reconstruction and
//! rendering. Every converter talks to a [`PdfSource`] only.

pub mod memory;
mod pdfium;

pub use self::pdfium::{bind_pdfium, PdfiumPage, PdfiumSource};
pub use memory::{MemoryPage, MemorySource};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Page dimensions in PDF units (1/72 inch) at scale 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
}

impl PageSize {
    /// Create a new page size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// US Letter (8.5 x 11 inches).
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Check if the page is in landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// A positioned text item as reported by the PDF library.
///
/// Coordinates are in PDF space (origin bottom-left). The transform is the
/// combined text/CTM matrix `[a, b, c, d, e, f]` with the font size folded
/// into the scale components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTextItem {
    /// The text content
    pub text: String,
    /// Text rendering matrix
    pub transform: [f32; 6],
    /// Advance width, when the library reports one
    pub width: Option<f32>,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
}

impl RawTextItem {
    /// Create an unrotated item at `(x, y)` (bottom-up) with the given size.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            transform: [font_size, 0.0, 0.0, font_size, x, y],
            width: None,
            font_name: String::new(),
        }
    }

    /// Set the advance width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the font name.
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        self
    }

    /// Replace the whole transform matrix.
    pub fn with_transform(mut self, transform: [f32; 6]) -> Self {
        self.transform = transform;
        self
    }
}

/// Background a page is rendered onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Background {
    /// Fully transparent; unpainted pixels keep alpha 0.
    #[default]
    Transparent,
    /// Opaque white.
    White,
}

/// A rasterization request in backing pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterRequest {
    /// Backing width in pixels
    pub width: u32,
    /// Backing height in pixels
    pub height: u32,
    /// Surface background
    pub background: Background,
}

/// A freshly rendered RGBA8 drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Row-major RGBA8 pixels, `width * height * 4` bytes
    pub pixels: Vec<u8>,
}

/// A single loaded page.
///
/// A page value owns its decoded library resources; dropping it releases
/// them. Converters drop each page before loading the next one.
pub trait SourcePage {
    /// Page size at scale 1.
    fn size(&self) -> PageSize;

    /// Positioned text items in content-stream emission order.
    fn text_items(&self) -> Result<Vec<RawTextItem>>;

    /// Render the page onto a new surface of the requested size, using the
    /// highest smoothing quality the backend supports.
    fn render(&self, request: &RasterRequest) -> Result<Surface>;
}

/// Abstract interface for an opened PDF document.
pub trait PdfSource {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Load the page at a 0-based index.
    fn page(&self, index: u32) -> Result<Box<dyn SourcePage + '_>>;
}
