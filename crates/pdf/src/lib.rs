use std::path::Path;

use thiserror::Error;

use parser::backend::{LopdfBackend, PdfBackend};

pub mod parser;
pub mod types;

pub use types::*;

/// How far into the input the `%PDF-` marker may appear. Some producers
/// prepend junk before the header, and readers tolerate it within 1 KiB.
const HEADER_SEARCH_WINDOW: usize = 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Input is not a PDF: {0}")]
    MalformedInput(String),
    #[error("PDF extraction error: {0}")]
    Extraction(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PdfError {
    /// True when the bytes were never a PDF, as opposed to a PDF we could not read.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, PdfError::MalformedInput(_))
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Recover the text of every page, in page order.
///
/// A page whose content cannot be read contributes an empty string and a
/// warning; only a bad container or a document without pages is an error.
pub fn extract_pages(bytes: &[u8]) -> Result<ExtractedPdf, PdfError> {
    check_header(bytes)?;

    let backend = LopdfBackend::load_bytes(bytes)?;
    let page_map = backend.pages();
    if page_map.is_empty() {
        return Err(PdfError::Extraction("document has no pages".to_string()));
    }

    let mut pages = Vec::with_capacity(page_map.len());
    for (&page_num, &page_id) in &page_map {
        match parser::text::extract_page_text(&backend, page_id) {
            Ok(text) => pages.push(text),
            Err(e) => {
                log::warn!("page {}: {}; using empty text", page_num, e);
                pages.push(String::new());
            }
        }
    }

    log::debug!("extracted {} pages", pages.len());

    Ok(ExtractedPdf {
        pages,
        metadata: extract_metadata(&backend),
    })
}

/// Read a file and delegate to [`extract_pages`].
pub fn extract_pages_from_path(path: &Path) -> Result<ExtractedPdf, PdfError> {
    let bytes = std::fs::read(path)?;
    extract_pages(&bytes)
}

/// Get document metadata without walking any content streams.
pub fn info(bytes: &[u8]) -> Result<DocumentMetadata, PdfError> {
    check_header(bytes)?;
    let backend = LopdfBackend::load_bytes(bytes)?;
    Ok(extract_metadata(&backend))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn check_header(bytes: &[u8]) -> Result<(), PdfError> {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    if window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        Ok(())
    } else {
        Err(PdfError::MalformedInput(format!(
            "no %PDF- header in the first {} bytes",
            HEADER_SEARCH_WINDOW
        )))
    }
}

fn extract_metadata(backend: &LopdfBackend) -> DocumentMetadata {
    let raw = backend.metadata();
    DocumentMetadata {
        title: raw.get("Title").cloned(),
        author: raw.get("Author").cloned(),
        creator: raw.get("Creator").cloned(),
        page_count: backend.page_count(),
    }
}
