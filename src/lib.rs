//! # pdfquick
//!
//! Local PDF conversion for Rust.
//!
//! Converts a PDF into page images (PNG or JPG), layout-preserving plain
//! text, or a pair of Word documents: a *visual* one made of page pictures
//! and an *editable* one rebuilt from the text layer with headings,
//! alignment, indentation and spacing.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfquick::{OutputFormat, PdfQuick};
//!
//! fn main() -> pdfquick::Result<()> {
//!     let artifacts = PdfQuick::new()
//!         .with_image_scale(3.0)
//!         .convert_file("report.pdf", OutputFormat::Png, |p| {
//!             println!("page {}/{} ({}%)", p.current_page, p.total_pages, p.percent);
//!         })?;
//!
//!     for artifact in &artifacts {
//!         std::fs::write(&artifact.name, &artifact.content)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - [`source`]: the PDF library seam (`PdfSource` / `SourcePage`), with a
//!   pdfium backend and an in-memory backend
//! - [`extract`]: positioned glyph runs from a page's text layer
//! - [`layout`]: runs to lines, lines to text or classified paragraphs
//! - [`raster`]: page rendering, alpha flattening and bitmap encoding
//! - [`convert`]: the image, text and word converters
//! - [`package`]: download names and zip bundling

pub mod convert;
pub mod detect;
pub mod error;
pub mod extract;
pub mod layout;
pub mod package;
pub mod raster;
pub mod source;

// Re-export commonly used types
pub use convert::{
    convert, convert_to_images, convert_to_text, convert_to_word, convert_to_word_visual,
    Artifact, ConvertOptions, ImageFormat, OutputFormat, Progress,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, validate_input, PdfFormat};
pub use error::{Error, Result};
pub use extract::GlyphRun;
pub use layout::{Alignment, HeadingLevel, Line, Paragraph};
pub use package::{download_name, save_artifacts, zip_artifacts};
pub use source::{bind_pdfium, MemoryPage, MemorySource, PdfSource, PdfiumSource, SourcePage};

pub use pdfium_render::prelude::Pdfium;

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Open a PDF held in memory with an already bound pdfium library.
///
/// # Example
///
/// ```no_run
/// use pdfquick::{bind_pdfium, open_pdf, PdfSource};
///
/// let pdfium = bind_pdfium()?;
/// let data = std::fs::read("document.pdf")?;
/// let source = open_pdf(&pdfium, &data, None)?;
/// println!("Pages: {}", source.page_count());
/// # Ok::<(), pdfquick::Error>(())
/// ```
pub fn open_pdf<'a>(
    pdfium: &'a Pdfium,
    data: &'a [u8],
    password: Option<&'a str>,
) -> Result<PdfiumSource<'a>> {
    PdfiumSource::from_bytes(pdfium, data, password)
}

/// Size and orientation of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    /// 1-based page number
    pub number: u32,
    /// Width in points
    pub width: f32,
    /// Height in points
    pub height: f32,
    /// Wider than tall
    pub landscape: bool,
}

/// Summary of a document, as reported by `pdfquick info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// PDF header version
    pub version: String,
    /// Input size in bytes
    pub file_size: u64,
    /// Number of pages
    pub page_count: u32,
    /// Per-page geometry
    pub pages: Vec<PageInfo>,
}

impl DocumentInfo {
    /// Collect page geometry from an opened source.
    pub fn collect(source: &dyn PdfSource, format: &PdfFormat, file_size: u64) -> Result<Self> {
        let pages = (0..source.page_count())
            .map(|index| {
                let size = source.page(index)?.size();
                Ok(PageInfo {
                    number: index + 1,
                    width: size.width,
                    height: size.height,
                    landscape: size.is_landscape(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            version: format.version.clone(),
            file_size,
            page_count: source.page_count(),
            pages,
        })
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Encode(e.to_string()))
    }
}

/// Builder tying conversion options, a password and input validation
/// together.
///
/// # Example
///
/// ```no_run
/// use pdfquick::{OutputFormat, PdfQuick};
///
/// let artifacts = PdfQuick::new()
///     .with_password("secret")
///     .convert_file("statement.pdf", OutputFormat::Docx, |_| {})?;
/// assert_eq!(artifacts.len(), 2);
/// # Ok::<(), pdfquick::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfQuick {
    options: ConvertOptions,
    password: Option<String>,
    skip_validation: bool,
}

impl PdfQuick {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all conversion options.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the image render scale.
    pub fn with_image_scale(mut self, scale: f32) -> Self {
        self.options = self.options.with_image_scale(scale);
        self
    }

    /// Set the word visual render scale.
    pub fn with_word_scale(mut self, scale: f32) -> Self {
        self.options = self.options.with_word_scale(scale);
        self
    }

    /// Set the device pixel ratio.
    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.options = self.options.with_device_pixel_ratio(ratio);
        self
    }

    /// Set the JPEG quality.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.options = self.options.with_jpeg_quality(quality);
        self
    }

    /// Attach a cancellation flag.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.options = self.options.with_cancel_flag(flag);
        self
    }

    /// Set document password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Skip the extension and size checks. The PDF header is still checked.
    pub fn without_validation(mut self) -> Self {
        self.skip_validation = true;
        self
    }

    /// The conversion options in effect.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Validate input bytes the way a user-facing upload is validated.
    pub fn validate(&self, file_name: &str, data: &[u8]) -> Result<PdfFormat> {
        if self.skip_validation {
            detect_format_from_bytes(data)
        } else {
            validate_input(file_name, None, data)
        }
    }

    /// Convert a PDF file.
    pub fn convert_file<P, F>(&self, path: P, format: OutputFormat, on_progress: F) -> Result<Vec<Artifact>>
    where
        P: AsRef<Path>,
        F: FnMut(Progress),
    {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidInput(format!("not a file path: {}", path.display())))?;
        let data = std::fs::read(path)?;
        self.convert_bytes(&data, file_name, format, on_progress)
    }

    /// Convert a PDF held in memory. `file_name` names the artifacts.
    pub fn convert_bytes<F>(
        &self,
        data: &[u8],
        file_name: &str,
        format: OutputFormat,
        on_progress: F,
    ) -> Result<Vec<Artifact>>
    where
        F: FnMut(Progress),
    {
        let pdf_format = self.validate(file_name, data)?;
        log::info!(
            "Converting {} ({}, {}) to {}",
            file_name,
            pdf_format,
            detect::format_file_size(data.len() as u64),
            format.label()
        );

        let pdfium = bind_pdfium()?;
        let source = open_pdf(&pdfium, data, self.password.as_deref())?;
        convert(&source, file_name, format, &self.options, on_progress)
    }

    /// Summarize a PDF held in memory without converting it.
    pub fn inspect_bytes(&self, data: &[u8], file_name: &str) -> Result<DocumentInfo> {
        let pdf_format = self.validate(file_name, data)?;
        let pdfium = bind_pdfium()?;
        let source = open_pdf(&pdfium, data, self.password.as_deref())?;
        DocumentInfo::collect(&source, &pdf_format, data.len() as u64)
    }
}

/// Async wrappers running the blocking pipeline on tokio's blocking pool.
#[cfg(feature = "async")]
pub mod nonblocking {
    use super::{Artifact, Error, OutputFormat, PdfQuick, Result};
    use std::path::PathBuf;

    fn join_error(err: tokio::task::JoinError) -> Error {
        Error::Other(format!("conversion task failed: {}", err))
    }

    /// Convert a PDF held in memory without blocking the runtime.
    pub async fn convert_bytes_async(
        converter: PdfQuick,
        data: Vec<u8>,
        file_name: String,
        format: OutputFormat,
    ) -> Result<Vec<Artifact>> {
        tokio::task::spawn_blocking(move || {
            converter.convert_bytes(&data, &file_name, format, |_| {})
        })
        .await
        .map_err(join_error)?
    }

    /// Convert a PDF file without blocking the runtime.
    pub async fn convert_file_async(
        converter: PdfQuick,
        path: impl Into<PathBuf>,
        format: OutputFormat,
    ) -> Result<Vec<Artifact>> {
        let path = path.into();
        tokio::task::spawn_blocking(move || converter.convert_file(&path, format, |_| {}))
            .await
            .map_err(join_error)?
    }
}
