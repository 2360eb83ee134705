//! Lexical importance scoring.
//!
//! Each chapter's raw score is the mean of its TF-IDF vector plus a keyword
//! boost. Raw scores are min-max normalized over the current document only
//! and bucketed into [`Weightage`] tiers.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::Regex;

use crate::config::ScoringConfig;
use crate::types::{Chapter, TopicEntry, Weightage};

/// Normalized score given to every chapter when all raw scores tie.
pub const TIED_SCORE: f64 = 0.5;

/// Raw scores closer than this are treated as equal.
const TIE_EPSILON: f64 = 1e-12;

const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "either",
    "else", "etc", "ever", "every", "few", "for", "from", "further", "had", "has", "have",
    "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "however",
    "if", "in", "into", "is", "it", "its", "itself", "just", "may", "me", "might", "more", "most",
    "must", "my", "myself", "neither", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "since", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "thus", "to",
    "too", "under", "until", "up", "upon", "us", "very", "was", "we", "were", "what", "when",
    "where", "whether", "which", "while", "who", "whom", "whose", "why", "will", "with",
    "within", "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

/// Score every chapter. Output order and length match `chapters`.
pub fn score_chapters(chapters: &[Chapter], config: &ScoringConfig) -> Vec<TopicEntry> {
    let docs: Vec<&str> = chapters.iter().map(|c| c.clean_content.as_str()).collect();
    let tfidf = tfidf_scores(&docs);
    let keywords = keyword_matcher(&config.keywords);

    let raw: Vec<f64> = docs
        .iter()
        .zip(&tfidf)
        .map(|(doc, base)| {
            let hits = keywords
                .as_ref()
                .map(|re| re.find_iter(doc).count())
                .unwrap_or(0);
            base + config.boost_factor * hits as f64
        })
        .collect();

    let normalized = normalize_scores(&raw);

    chapters
        .iter()
        .zip(raw.iter().zip(&normalized))
        .map(|(chapter, (&raw_score, &normalized_score))| TopicEntry {
            chapter_title: chapter.title.clone(),
            raw_score,
            normalized_score,
            weightage: weightage_for(normalized_score, config),
            snippet: snippet(&chapter.clean_content, config.snippet_chars),
        })
        .collect()
}

/// Lowercased tokens of two or more word characters, stop words removed.
pub fn tokenize(text: &str) -> Vec<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"));
    re.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

/// Mean TF-IDF weight of each document over the shared vocabulary.
///
/// Uses smoothed idf, `ln((1 + n) / (1 + df)) + 1`, and L2-normalized
/// document vectors. Documents without tokens score 0.
pub fn tfidf_scores(docs: &[&str]) -> Vec<f64> {
    let tokenized: Vec<Vec<String>> = docs.iter().map(|d| tokenize(d)).collect();

    let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
    for tokens in &tokenized {
        let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        for term in seen {
            *doc_freq.entry(term).or_insert(0) += 1;
        }
    }

    let vocab_size = doc_freq.len();
    if vocab_size == 0 {
        return vec![0.0; docs.len()];
    }

    let n = docs.len() as f64;
    tokenized
        .iter()
        .map(|tokens| {
            let mut tf: HashMap<&str, usize> = HashMap::new();
            for t in tokens {
                *tf.entry(t.as_str()).or_insert(0) += 1;
            }
            let weights: Vec<f64> = tf
                .iter()
                .map(|(term, &count)| {
                    let df = doc_freq.get(term).copied().unwrap_or(1) as f64;
                    let idf = ((1.0 + n) / (1.0 + df)).ln() + 1.0;
                    count as f64 * idf
                })
                .collect();
            let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
            if norm == 0.0 {
                return 0.0;
            }
            weights.iter().sum::<f64>() / norm / vocab_size as f64
        })
        .collect()
}

/// Count case-insensitive, whole-word keyword occurrences in `text`.
pub fn keyword_occurrences(text: &str, keywords: &[String]) -> usize {
    keyword_matcher(keywords)
        .map(|re| re.find_iter(text).count())
        .unwrap_or(0)
}

fn keyword_matcher(keywords: &[String]) -> Option<Regex> {
    let alternatives: Vec<String> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(|k| regex::escape(k).replace(' ', r"\s+"))
        .collect();
    if alternatives.is_empty() {
        return None;
    }
    let pattern = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("ignoring keyword list, pattern failed to compile: {e}");
            None
        }
    }
}

/// Min-max scale into `[0, 1]`. When every score ties, each one maps to
/// [`TIED_SCORE`].
pub fn normalize_scores(raw: &[f64]) -> Vec<f64> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if raw.is_empty() || !range.is_finite() || range <= TIE_EPSILON {
        return vec![TIED_SCORE; raw.len()];
    }

    raw.iter()
        .map(|r| ((r - min) / range).clamp(0.0, 1.0))
        .collect()
}

/// Tier for a normalized score. Lower bounds are inclusive.
pub fn weightage_for(score: f64, config: &ScoringConfig) -> Weightage {
    if score >= config.high_threshold {
        Weightage::High
    } else if score >= config.medium_threshold {
        Weightage::Medium
    } else {
        Weightage::Low
    }
}

/// First `max_chars` characters of `text`, cut back to a word boundary.
pub fn snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.trim().to_string();
    }

    let cut = text
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let head = &text[..cut];

    // The cut already lands between words.
    if text[cut..].starts_with(char::is_whitespace) {
        return head.trim_end().to_string();
    }

    match head.rfind(char::is_whitespace) {
        Some(pos) => head[..pos].trim_end().to_string(),
        None => head.to_string(),
    }
}
