//! In-memory page source.
//!
//! Holds pre-extracted text items and a flat page colour. Used for
//! fixtures and for callers that already have positioned text from another
//! pipeline.

use std::cell::Cell;

use super::{Background, PageSize, PdfSource, RasterRequest, RawTextItem, SourcePage, Surface};
use crate::error::{Error, Result};

/// A page held entirely in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryPage {
    /// Page size at scale 1
    pub size: PageSize,
    /// Text items in emission order
    pub items: Vec<RawTextItem>,
    /// RGBA colour the page paints over its whole area
    pub ink: [u8; 4],
    /// Simulate a backend that cannot provide a drawing surface
    pub unrenderable: bool,
}

impl MemoryPage {
    /// Create an empty page of the given size.
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            items: Vec::new(),
            ink: [0, 0, 0, 0],
            unrenderable: false,
        }
    }

    /// Create an empty US Letter page.
    pub fn letter() -> Self {
        Self::new(PageSize::letter())
    }

    /// Add a text item.
    pub fn with_item(mut self, item: RawTextItem) -> Self {
        self.items.push(item);
        self
    }

    /// Add several text items.
    pub fn with_items(mut self, items: impl IntoIterator<Item = RawTextItem>) -> Self {
        self.items.extend(items);
        self
    }

    /// Set the colour painted over the page.
    pub fn with_ink(mut self, ink: [u8; 4]) -> Self {
        self.ink = ink;
        self
    }

    /// Make every render attempt fail.
    pub fn unrenderable(mut self) -> Self {
        self.unrenderable = true;
        self
    }
}

/// Borrowed view of a [`MemoryPage`] handed out by [`MemorySource`].
struct LoadedMemoryPage<'a> {
    page: &'a MemoryPage,
    released: &'a Cell<u32>,
}

impl SourcePage for LoadedMemoryPage<'_> {
    fn size(&self) -> PageSize {
        self.page.size
    }

    fn text_items(&self) -> Result<Vec<RawTextItem>> {
        Ok(self.page.items.clone())
    }

    fn render(&self, request: &RasterRequest) -> Result<Surface> {
        if self.page.unrenderable {
            return Err(Error::Render("failed to get a drawing context".into()));
        }

        let base = match request.background {
            Background::Transparent => [0, 0, 0, 0],
            Background::White => [255, 255, 255, 255],
        };
        let pixel = composite_over(self.page.ink, base);
        let count = request.width as usize * request.height as usize;

        Ok(Surface {
            width: request.width,
            height: request.height,
            pixels: pixel.repeat(count),
        })
    }
}

impl Drop for LoadedMemoryPage<'_> {
    fn drop(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

/// Source-over compositing of one RGBA8 pixel onto another.
fn composite_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }

    let channel = |i: usize| {
        let value = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };

    [channel(0), channel(1), channel(2), (out_a * 255.0).round() as u8]
}

/// A document held entirely in memory.
#[derive(Debug, Default)]
pub struct MemorySource {
    pages: Vec<MemoryPage>,
    released: Cell<u32>,
}

impl MemorySource {
    /// Create a source from pages.
    pub fn new(pages: Vec<MemoryPage>) -> Self {
        Self {
            pages,
            released: Cell::new(0),
        }
    }

    /// Number of page handles dropped so far.
    pub fn released_pages(&self) -> u32 {
        self.released.get()
    }
}

impl PdfSource for MemorySource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page(&self, index: u32) -> Result<Box<dyn SourcePage + '_>> {
        let page = self
            .pages
            .get(index as usize)
            .ok_or(Error::PageOutOfRange(index + 1, self.page_count()))?;

        Ok(Box::new(LoadedMemoryPage {
            page,
            released: &self.released,
        }))
    }
}
