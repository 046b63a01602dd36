//! Artifact naming and packaging.

use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::convert::Artifact;
use crate::error::{Error, Result};

/// Deflate level used for archives.
pub const ZIP_COMPRESSION_LEVEL: i64 = 6;

/// MIME type of zip archives.
pub const ZIP_MIME_TYPE: &str = "application/zip";

fn pdf_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\.pdf$").expect("static regex"))
}

/// Strip a trailing `.pdf` (any case) from a file name.
pub fn base_name(file_name: &str) -> &str {
    match pdf_suffix().find(file_name) {
        Some(m) => &file_name[..m.start()],
        None => file_name,
    }
}

/// Download name for an output file.
///
/// `page_index` is 0-based; the name carries the 1-based page number.
pub fn download_name(original: &str, extension: &str, page_index: Option<u32>) -> String {
    let base = base_name(original);
    match page_index {
        Some(index) => format!("{}_page{}.{}", base, index + 1, extension),
        None => format!("{}.{}", base, extension),
    }
}

/// Name of the archive bundling several outputs.
pub fn archive_name(original: &str) -> String {
    format!("{}_converted.zip", base_name(original))
}

/// Bundle artifacts into a deflate-compressed zip archive.
pub fn zip_artifacts(artifacts: &[Artifact]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(ZIP_COMPRESSION_LEVEL));

    for artifact in artifacts {
        writer.start_file(artifact.name.as_str(), options)?;
        writer.write_all(&artifact.content)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

/// Turn conversion output into what a user downloads: the artifact itself
/// when there is one, a zip archive otherwise.
pub fn bundle(artifacts: Vec<Artifact>, original: &str) -> Result<Artifact> {
    match artifacts.len() {
        0 => Err(Error::InvalidInput("No files to download".into())),
        1 => Ok(artifacts.into_iter().next().ok_or_else(|| {
            Error::Other("artifact list emptied while bundling".into())
        })?),
        n => {
            log::debug!("Bundling {} artifacts into an archive", n);
            Ok(Artifact::new(
                archive_name(original),
                zip_artifacts(&artifacts)?,
                ZIP_MIME_TYPE,
            ))
        }
    }
}

/// Write every artifact into a directory, creating it if needed.
///
/// Returns the written paths in artifact order.
pub fn write_artifacts(artifacts: &[Artifact], dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    artifacts
        .iter()
        .map(|artifact| {
            let path = dir.join(&artifact.name);
            let mut file = File::create(&path)?;
            file.write_all(&artifact.content)?;
            Ok(path)
        })
        .collect()
}

/// Save conversion output into a directory: a single artifact as-is,
/// several as one zip archive.
pub fn save_artifacts(artifacts: Vec<Artifact>, original: &str, dir: &Path) -> Result<PathBuf> {
    let saved = bundle(artifacts, original)?;
    let mut paths = write_artifacts(std::slice::from_ref(&saved), dir)?;
    paths
        .pop()
        .ok_or_else(|| Error::Other("nothing was written".into()))
}
