//! Best-effort file outputs: document bytes, page snapshots, extracted text

use crate::export::filename::sanitize_filename;
use crate::viewer::PageBitmap;
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Nothing to export")]
    NothingToExport,

    #[error("Export directory not found")]
    ExportDirNotFound,

    #[error("Bitmap dimensions do not match pixel data")]
    MalformedBitmap,
}

/// Snapshot encodings supported for the rendered page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotFormat {
    Png,
    Jpeg,
}

impl SnapshotFormat {
    fn extension(self) -> &'static str {
        match self {
            SnapshotFormat::Png => "png",
            SnapshotFormat::Jpeg => "jpg",
        }
    }
}

/// Write the document's raw bytes next to the given name.
pub fn export_document_bytes(bytes: &[u8], export_dir: &Path, name: &str) -> Result<PathBuf> {
    if bytes.is_empty() {
        return Err(ExportError::NothingToExport.into());
    }

    let path = unique_path(export_dir, &sanitize_filename(name), "pdf")?;
    fs::write(&path, bytes).with_context(|| format!("Failed to write to {}", path.display()))?;

    info!("Exported document copy to {}", path.display());
    Ok(path)
}

/// Encode the last rendered bitmap as a PNG or JPEG snapshot.
pub fn export_snapshot(
    bitmap: &PageBitmap,
    format: SnapshotFormat,
    export_dir: &Path,
    name: &str,
) -> Result<PathBuf> {
    let expected = bitmap.width as usize * bitmap.height as usize * 3;
    if expected == 0 {
        return Err(ExportError::NothingToExport.into());
    }
    if bitmap.pixels.len() != expected {
        return Err(ExportError::MalformedBitmap.into());
    }

    let image = image::RgbImage::from_raw(bitmap.width, bitmap.height, bitmap.pixels.clone())
        .ok_or(ExportError::MalformedBitmap)?;

    let stem = format!("{}-p{}", sanitize_filename(name), bitmap.page);
    let path = unique_path(export_dir, &stem, format.extension())?;

    match format {
        SnapshotFormat::Png => image
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("Failed to encode PNG to {}", path.display()))?,
        SnapshotFormat::Jpeg => image
            .save_with_format(&path, image::ImageFormat::Jpeg)
            .with_context(|| format!("Failed to encode JPEG to {}", path.display()))?,
    }

    info!("Exported page {} snapshot to {}", bitmap.page, path.display());
    Ok(path)
}

/// Join per-page extracted text into one plain-text file.
///
/// Pages are separated by a blank line; wholly empty extractions still
/// produce a file so the user sees the document really had no text.
pub fn export_text(pages: &[String], export_dir: &Path, name: &str) -> Result<PathBuf> {
    if pages.is_empty() {
        return Err(ExportError::NothingToExport.into());
    }

    let mut output = String::new();
    for (i, text) in pages.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(text.trim_end());
        output.push('\n');
    }

    let path = unique_path(export_dir, &sanitize_filename(name), "txt")?;
    fs::write(&path, output).with_context(|| format!("Failed to write to {}", path.display()))?;

    info!("Exported text of {} pages to {}", pages.len(), path.display());
    Ok(path)
}

/// First free path of the form `stem.ext`, `stem-1.ext`, `stem-2.ext`, ...
fn unique_path(export_dir: &Path, stem: &str, extension: &str) -> Result<PathBuf> {
    if !export_dir.exists() {
        return Err(ExportError::ExportDirNotFound.into());
    }

    let mut path = export_dir.join(format!("{stem}.{extension}"));
    let mut counter = 1;
    while path.exists() {
        path = export_dir.join(format!("{stem}-{counter}.{extension}"));
        counter += 1;
    }
    Ok(path)
}
