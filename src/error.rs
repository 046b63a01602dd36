//! Error types for pdfquick.

use std::io;
use thiserror::Error;

/// Result type alias for pdfquick operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a PDF.
///
/// Every variant is terminal for the conversion call that produced it:
/// a failing page aborts the whole multi-page loop and no partial
/// artifacts are returned.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input or writing artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document requires a password.
    #[error("This PDF is password protected. Please remove the password and try again.")]
    PasswordProtected,

    /// The PDF library rejected the file as malformed.
    #[error("This file appears to be corrupted or is not a valid PDF.")]
    InvalidPdf,

    /// Any other failure reported by the PDF library.
    #[error("PDF library error: {0}")]
    PdfLibrary(String),

    /// No drawing surface could be acquired for a page.
    #[error("Rendering error: {0}")]
    Render(String),

    /// No text could be extracted from the document.
    #[error("No text could be extracted. This may be a scanned document or image-based PDF.")]
    EmptyExtraction,

    /// A bitmap or document package could not be encoded.
    #[error("Encoding error: {0}")]
    Encode(String),

    /// The input does not start with a PDF header.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header names a version we do not recognise.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The input exceeds the accepted size.
    #[error("File size exceeds {limit}. Please select a smaller file.")]
    FileTooLarge {
        /// Human readable limit, e.g. "20 MB".
        limit: String,
    },

    /// The input was rejected before conversion started.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// The caller cancelled the conversion between two pages.
    #[error("Conversion cancelled")]
    Cancelled,

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Classify a failure message reported by the PDF library.
    ///
    /// Password failures and structural failures get their own variants so
    /// callers can show a targeted message; everything else is passed through.
    pub fn from_library_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if lower.contains("password") {
            Error::PasswordProtected
        } else if lower.contains("invalid pdf") || lower.contains("formaterror") {
            Error::InvalidPdf
        } else {
            Error::PdfLibrary(message)
        }
    }

    /// Whether this error was raised because the caller cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

impl From<pdfium_render::prelude::PdfiumError> for Error {
    fn from(err: pdfium_render::prelude::PdfiumError) -> Self {
        Error::from_library_message(format!("{:?}", err))
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Encode(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Encode(err.to_string())
    }
}
