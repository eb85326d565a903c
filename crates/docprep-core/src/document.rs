//! Document text extraction
//!
//! PDFs go through `pdf_extract` (pure Rust, no external libraries), with
//! `lopdf` used only to report the page count. Everything else is read as
//! UTF-8 text.

use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// Extract all text from a PDF.
///
/// Fails when the file is missing, when the PDF cannot be parsed, and when
/// no text comes out of it (scanned or image-only documents).
pub fn extract_text_from_pdf(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }

    match pdf_page_count(path) {
        Ok(pages) => info!("Processing PDF with {} pages", pages),
        Err(e) => debug!("Could not read page count for {}: {:#}", path.display(), e),
    }

    let text = pdf_extract::extract_text(path)
        .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))?;

    if text.trim().is_empty() {
        bail!(
            "No text could be extracted from {}. It might be scanned or contain only images.",
            path.display()
        );
    }

    info!("Successfully extracted {} characters", text.chars().count());
    Ok(text)
}

/// Number of pages in a PDF.
pub fn pdf_page_count(path: &Path) -> Result<usize> {
    let doc = lopdf::Document::load(path)
        .with_context(|| format!("Failed to load PDF: {}", path.display()))?;
    Ok(doc.get_pages().len())
}

/// Write extracted text to `path`.
pub fn save_text_to_file(text: &str, path: &Path) -> Result<()> {
    std::fs::write(path, text)
        .with_context(|| format!("Failed to save text to {}", path.display()))?;
    info!("Text saved to {}", path.display());
    Ok(())
}

/// Text of a source document, dispatching on the file extension.
pub fn read_document_text(path: &Path) -> Result<String> {
    if is_pdf(path) {
        return extract_text_from_pdf(path);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read text file: {}", path.display()))
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
