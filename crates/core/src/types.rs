use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Title given to the single chapter produced when no headings are found.
pub const FULL_DOCUMENT_TITLE: &str = "Full Document";

/// Title given to the text that precedes the first detected heading.
pub const PREAMBLE_TITLE: &str = "Preamble";

/// Extracted text of one ingested file.
///
/// Built once by [`Document::from_pages`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub raw_pages: Vec<String>,
    pub raw_text: String,
    pub clean_text: String,
}

impl Document {
    /// Join the pages with `\n` and normalize the result.
    pub fn from_pages(raw_pages: Vec<String>) -> Self {
        let raw_text = raw_pages.join("\n");
        let clean_text = crate::normalize::normalize(&raw_text);
        Document {
            raw_pages,
            raw_text,
            clean_text,
        }
    }
}

/// A reason a line was flagged as a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingSignal {
    ShortLine,
    AllCaps,
    NumericPrefix,
    RomanNumeralPrefix,
    TitleCase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCandidate {
    pub line_index: usize,
    pub text: String,
    pub signals: BTreeSet<HeadingSignal>,
}

/// A contiguous, titled slice of the normalized document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub content: String,
    #[serde(skip)]
    pub clean_content: String,
    /// Line index of the heading that opened this chapter, if any.
    #[serde(skip)]
    pub heading_line: Option<usize>,
    /// Lines of the normalized document that make up `content`.
    #[serde(skip)]
    pub body_lines: Range<usize>,
}

impl Chapter {
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// Coarse priority tier derived from a normalized score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weightage {
    High,
    Medium,
    Low,
}

impl fmt::Display for Weightage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weightage::High => write!(f, "High"),
            Weightage::Medium => write!(f, "Medium"),
            Weightage::Low => write!(f, "Low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicEntry {
    #[serde(rename = "title")]
    pub chapter_title: String,
    pub raw_score: f64,
    #[serde(rename = "score")]
    pub normalized_score: f64,
    pub weightage: Weightage,
    pub snippet: String,
}

/// Everything the pipeline hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub raw_text: String,
    pub clean_text: String,
    pub chapters: Vec<Chapter>,
    pub topics: Vec<TopicEntry>,
}
