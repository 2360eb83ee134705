//! Layout-free heading detection.
//!
//! Every check is an independent predicate over a single line. A line becomes
//! a [`HeadingCandidate`] when at least one of the heading rules holds; all
//! signals that fired are recorded so callers can weigh them later.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::HeadingConfig;
use crate::types::{HeadingCandidate, HeadingSignal};

/// Share of letters that must be uppercase for a line to count as all caps.
const UPPERCASE_RATIO: f64 = 0.8;

/// Longest title-cased line, in words, still considered a heading.
const MAX_TITLE_WORDS: usize = 12;

/// Words allowed to stay lowercase inside a title-cased heading.
const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "from", "in", "into", "of", "on", "or",
    "the", "to", "vs", "via", "with",
];

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

const BULLET_MARKERS: &[&str] = &["- ", "* ", "\u{2022} "];

/// Scan `lines` and return every heading candidate in line order.
pub fn detect_headings(lines: &[&str], config: &HeadingConfig) -> Vec<HeadingCandidate> {
    let candidates: Vec<HeadingCandidate> = lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| evaluate_line(idx, line, config))
        .collect();

    log::debug!(
        "detected {} heading candidates in {} lines",
        candidates.len(),
        lines.len()
    );

    candidates
}

/// Evaluate one line against every predicate.
pub fn evaluate_line(
    line_index: usize,
    line: &str,
    config: &HeadingConfig,
) -> Option<HeadingCandidate> {
    let text = line.trim();
    if text.is_empty() {
        return None;
    }

    let mut signals = BTreeSet::new();
    let short = is_short(text, config.max_heading_chars);
    if short {
        signals.insert(HeadingSignal::ShortLine);
    }
    // Case-based rules say nothing about bullets or running page labels.
    let case_counts = !is_list_item(text) && !is_page_marker(text);
    if case_counts && is_all_caps(text) {
        signals.insert(HeadingSignal::AllCaps);
    }
    if has_numeric_prefix(text) {
        signals.insert(HeadingSignal::NumericPrefix);
    }
    if has_roman_numeral_prefix(text) {
        signals.insert(HeadingSignal::RomanNumeralPrefix);
    }
    if short && case_counts && is_title_case(text) {
        signals.insert(HeadingSignal::TitleCase);
    }

    let is_heading = (short && signals.contains(&HeadingSignal::AllCaps))
        || signals.contains(&HeadingSignal::NumericPrefix)
        || signals.contains(&HeadingSignal::RomanNumeralPrefix)
        || signals.contains(&HeadingSignal::TitleCase);

    is_heading.then(|| HeadingCandidate {
        line_index,
        text: text.to_string(),
        signals,
    })
}

fn is_short(text: &str, max_chars: usize) -> bool {
    text.chars().count() <= max_chars
}

fn is_all_caps(text: &str) -> bool {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() < 2 {
        return false;
    }
    let upper = letters.iter().filter(|c| c.is_uppercase()).count();
    upper as f64 / letters.len() as f64 >= UPPERCASE_RATIO
}

fn has_numeric_prefix(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+[.)]\s").expect("valid numeric prefix regex"))
        .is_match(text)
}

fn has_roman_numeral_prefix(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[IVXLCM]+[.)]\s").expect("valid roman prefix regex"))
        .is_match(text)
}

fn is_list_item(text: &str) -> bool {
    BULLET_MARKERS.iter().any(|marker| text.starts_with(*marker))
}

/// `Page 3`, `Page 3 of 10`, `PAGE 3/10`.
fn is_page_marker(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^page\s+\d+(\s*(of|/)\s*\d+)?$").expect("valid page marker regex")
    })
    .is_match(text)
}

fn is_title_case(text: &str) -> bool {
    if text.ends_with(TRAILING_PUNCTUATION) {
        return false;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > MAX_TITLE_WORDS {
        return false;
    }

    let mut saw_word = false;
    for (i, word) in words.iter().enumerate() {
        let Some(first) = word.chars().next() else {
            continue;
        };
        if !first.is_alphabetic() {
            // Numbers, symbols and dashes don't break the title shape, but
            // the first token must be a real word.
            if i == 0 {
                return false;
            }
            continue;
        }
        saw_word = true;
        if first.is_uppercase() {
            continue;
        }
        if i > 0 && MINOR_WORDS.contains(&word.to_lowercase().as_str()) {
            continue;
        }
        return false;
    }

    saw_word
}
