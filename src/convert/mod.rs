//! Page-by-page converters.
//!
//! Each converter walks a [`PdfSource`] in page order, loading one page at a
//! time and dropping it before the next is loaded, and reports progress
//! after every page.
//!
//! # Example
//!
//! ```no_run
//! use pdfquick::convert::{convert, ConvertOptions, OutputFormat};
//! use pdfquick::source::{bind_pdfium, PdfiumSource};
//!
//! fn main() -> pdfquick::Result<()> {
//!     let pdfium = bind_pdfium()?;
//!     let data = std::fs::read("report.pdf")?;
//!     let source = PdfiumSource::from_bytes(&pdfium, &data, None)?;
//!
//!     let artifacts = convert(
//!         &source,
//!         "report.pdf",
//!         OutputFormat::Txt,
//!         &ConvertOptions::default(),
//!         |p| println!("{}%", p.percent),
//!     )?;
//!     println!("{}", String::from_utf8_lossy(&artifacts[0].content));
//!     Ok(())
//! }
//! ```

mod docx;
mod images;
mod text;
mod word;

pub use images::convert_to_images;
pub use text::{convert_to_text, PAGE_BANNER_WIDTH};
pub use word::{convert_to_word, convert_to_word_visual, document_stats};

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::source::PdfSource;

/// Default scale for image output.
pub const DEFAULT_IMAGE_SCALE: f32 = 4.0;

/// Default scale for the page pictures of the visual word document.
pub const DEFAULT_WORD_SCALE: f32 = 2.5;

/// Default JPEG quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 98;

/// MIME type of word-processing packages.
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Render scale for image output
    pub image_scale: f32,

    /// Render scale for word visual pages
    pub word_scale: f32,

    /// Backing pixels per logical pixel
    pub device_pixel_ratio: f32,

    /// JPEG quality (1-100)
    pub jpeg_quality: u8,

    /// Set to `true` to stop before the next page
    pub cancel_flag: Option<Arc<AtomicBool>>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            image_scale: DEFAULT_IMAGE_SCALE,
            word_scale: DEFAULT_WORD_SCALE,
            device_pixel_ratio: 1.0,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            cancel_flag: None,
        }
    }
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image render scale.
    pub fn with_image_scale(mut self, scale: f32) -> Self {
        self.image_scale = scale;
        self
    }

    /// Set the word visual render scale.
    pub fn with_word_scale(mut self, scale: f32) -> Self {
        self.word_scale = scale;
        self
    }

    /// Set the device pixel ratio.
    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    /// Set the JPEG quality, clamped to 1-100.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Attach a cancellation flag.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// Fail with [`Error::Cancelled`] if the flag is set.
    pub fn check_cancelled(&self) -> Result<()> {
        match &self.cancel_flag {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }

    /// Reject scales and ratios that cannot produce a surface.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("image scale", self.image_scale),
            ("word scale", self.word_scale),
            ("device pixel ratio", self.device_pixel_ratio),
        ];
        for (name, value) in checks {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidInput(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Progress after a page completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Overall percentage, 0-100
    pub percent: u8,
    /// 1-based page just finished
    pub current_page: u32,
    /// Pages in the document
    pub total_pages: u32,
}

impl Progress {
    /// Progress within a span of the overall percentage.
    ///
    /// `offset + round(current / total × span)`.
    pub fn within(current_page: u32, total_pages: u32, offset: u8, span: u8) -> Self {
        let fraction = if total_pages == 0 {
            1.0
        } else {
            current_page as f64 / total_pages as f64
        };
        let percent = offset as f64 + (fraction * span as f64).round();

        Self {
            percent: percent.min(100.0) as u8,
            current_page,
            total_pages,
        }
    }

    /// Progress across the whole 0-100 range.
    pub fn of(current_page: u32, total_pages: u32) -> Self {
        Self::within(current_page, total_pages, 0, 100)
    }
}

/// One output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Download file name
    pub name: String,
    /// File bytes
    pub content: Vec<u8>,
    /// MIME type
    pub mime_type: &'static str,
}

impl Artifact {
    /// Create an artifact.
    pub fn new(name: impl Into<String>, content: Vec<u8>, mime_type: &'static str) -> Self {
        Self {
            name: name.into(),
            content,
            mime_type,
        }
    }

    /// Content length in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the artifact has no content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Raster output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossless PNG with alpha
    #[default]
    Png,
    /// JPEG flattened onto white
    Jpg,
}

impl ImageFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
        }
    }

    /// MIME type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpg => "image/jpeg",
        }
    }
}

/// Every output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One PNG per page
    #[default]
    Png,
    /// One JPEG per page
    Jpg,
    /// Plain text
    Txt,
    /// Visual and editable word documents
    Docx,
}

impl OutputFormat {
    /// All formats, in display order.
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Png,
        OutputFormat::Jpg,
        OutputFormat::Txt,
        OutputFormat::Docx,
    ];

    /// Short label.
    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpg => "JPG",
            OutputFormat::Txt => "TXT",
            OutputFormat::Docx => "DOCX",
        }
    }

    /// One-line description.
    pub fn description(&self) -> &'static str {
        match self {
            OutputFormat::Png => "High-quality images",
            OutputFormat::Jpg => "Compressed images",
            OutputFormat::Txt => "Plain text",
            OutputFormat::Docx => "Word document",
        }
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Txt => "txt",
            OutputFormat::Docx => "docx",
        }
    }

    /// MIME type of the produced artifacts.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpg => "image/jpeg",
            OutputFormat::Txt => "text/plain",
            OutputFormat::Docx => DOCX_MIME_TYPE,
        }
    }

    /// The raster format, for image outputs.
    pub fn image_format(&self) -> Option<ImageFormat> {
        match self {
            OutputFormat::Png => Some(ImageFormat::Png),
            OutputFormat::Jpg => Some(ImageFormat::Jpg),
            _ => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpg),
            "txt" | "text" => Ok(OutputFormat::Txt),
            "docx" | "word" => Ok(OutputFormat::Docx),
            other => Err(Error::InvalidInput(format!("unknown output format: {}", other))),
        }
    }
}

/// Convert a document to the given format.
pub fn convert<F>(
    source: &dyn PdfSource,
    file_name: &str,
    format: OutputFormat,
    options: &ConvertOptions,
    on_progress: F,
) -> Result<Vec<Artifact>>
where
    F: FnMut(Progress),
{
    options.validate()?;

    match format {
        OutputFormat::Png => convert_to_images(source, file_name, ImageFormat::Png, options, on_progress),
        OutputFormat::Jpg => convert_to_images(source, file_name, ImageFormat::Jpg, options, on_progress),
        OutputFormat::Txt => convert_to_text(source, file_name, options, on_progress),
        OutputFormat::Docx => convert_to_word(source, file_name, options, on_progress),
    }
}
