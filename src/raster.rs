//! Page rasterization and bitmap encoding.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::source::{Background, RasterRequest, SourcePage};

/// Settings for one page render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Page units to logical pixels
    pub scale: f32,
    /// Backing pixels per logical pixel
    pub device_pixel_ratio: f32,
    /// Surface background
    pub background: Background,
}

impl RenderSettings {
    /// Create settings with a transparent background and a ratio of 1.
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            device_pixel_ratio: 1.0,
            background: Background::Transparent,
        }
    }

    /// Set the device pixel ratio.
    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    /// Set the background.
    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }
}

/// A rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    /// Backing width in pixels
    pub width: u32,
    /// Backing height in pixels
    pub height: u32,
    /// Viewport width in logical pixels
    pub logical_width: u32,
    /// Viewport height in logical pixels
    pub logical_height: u32,
    /// Row-major RGBA8 pixels
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// Whether any pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.pixels.par_chunks_exact(4).any(|px| px[3] < 255)
    }
}

/// Render a page at the given settings.
pub fn render_page(page: &dyn SourcePage, settings: &RenderSettings) -> Result<Bitmap> {
    let size = page.size();
    let logical_width = (size.width * settings.scale).floor() as u32;
    let logical_height = (size.height * settings.scale).floor() as u32;
    let width = (size.width * settings.scale * settings.device_pixel_ratio).floor() as u32;
    let height = (size.height * settings.scale * settings.device_pixel_ratio).floor() as u32;

    if width == 0 || height == 0 {
        return Err(Error::Render(format!(
            "cannot allocate a {}x{} drawing surface",
            width, height
        )));
    }

    let request = RasterRequest {
        width,
        height,
        background: settings.background,
    };
    let surface = page.render(&request)?;

    let expected = width as usize * height as usize * 4;
    if surface.pixels.len() != expected {
        return Err(Error::Render(format!(
            "surface holds {} bytes, expected {}",
            surface.pixels.len(),
            expected
        )));
    }

    log::debug!(
        "Rendered page {}x{} ({}x{} logical)",
        width,
        height,
        logical_width,
        logical_height
    );

    Ok(Bitmap {
        width,
        height,
        logical_width,
        logical_height,
        pixels: surface.pixels,
    })
}

/// Composite every non-opaque pixel onto white and make it opaque.
///
/// Trailing bytes that do not form a whole pixel are left untouched.
pub fn flatten_onto_white(pixels: &mut [u8]) {
    pixels.par_chunks_exact_mut(4).for_each(|px| {
        let alpha = px[3];
        if alpha == 255 {
            return;
        }
        let a = alpha as f32 / 255.0;
        for channel in &mut px[..3] {
            *channel = (*channel as f32 * a + 255.0 * (1.0 - a)).round() as u8;
        }
        px[3] = 255;
    });
}

/// Encode a bitmap as a lossless RGBA PNG.
pub fn encode_png(bitmap: &Bitmap) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    PngEncoder::new(&mut out).write_image(
        &bitmap.pixels,
        bitmap.width,
        bitmap.height,
        ExtendedColorType::Rgba8,
    )?;
    Ok(out.into_inner())
}

/// Encode a bitmap as a baseline JPEG. Alpha is dropped; flatten first.
pub fn encode_jpeg(bitmap: &Bitmap, quality: u8) -> Result<Vec<u8>> {
    let rgb: Vec<u8> = bitmap
        .pixels
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality).write_image(
        &rgb,
        bitmap.width,
        bitmap.height,
        ExtendedColorType::Rgb8,
    )?;
    Ok(out.into_inner())
}
