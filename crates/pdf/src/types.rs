use serde::{Deserialize, Serialize};

/// Entries of the trailer's Info dictionary plus the page count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub page_count: usize,
}

/// Text recovered from a PDF, one string per page in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPdf {
    pub pages: Vec<String>,
    pub metadata: DocumentMetadata,
}

impl ExtractedPdf {
    /// Pages joined with `\n`, exactly as extracted.
    pub fn raw_text(&self) -> String {
        self.pages.join("\n")
    }

    /// True when no page produced any non-whitespace text (e.g. a scan).
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.trim().is_empty())
    }
}
