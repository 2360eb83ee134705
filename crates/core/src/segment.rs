use crate::normalize::normalize;
use crate::types::{Chapter, HeadingCandidate, FULL_DOCUMENT_TITLE, PREAMBLE_TITLE};

/// Slice `text` into chapters at the candidate heading lines.
///
/// Chapter `i` owns the lines strictly between heading `i` and heading
/// `i + 1`. Text before the first heading becomes a "Preamble" chapter.
/// When nothing usable is found the whole text is returned as one
/// "Full Document" chapter, so the result is never empty.
pub fn segment(text: &str, candidates: &[HeadingCandidate]) -> Vec<Chapter> {
    let lines: Vec<&str> = text.split('\n').collect();

    // Boundaries must be strictly increasing and inside the text.
    let mut boundaries: Vec<&HeadingCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let in_range = candidate.line_index < lines.len();
        let ascending = boundaries
            .last()
            .is_none_or(|prev| prev.line_index < candidate.line_index);
        if in_range && ascending {
            boundaries.push(candidate);
        }
    }

    let Some(first) = boundaries.first() else {
        log::debug!("no heading candidates, using a single chapter");
        return vec![full_document(text, lines.len())];
    };

    let mut chapters = Vec::with_capacity(boundaries.len() + 1);

    if lines[..first.line_index].iter().any(|l| !l.trim().is_empty()) {
        chapters.push(build_chapter(
            PREAMBLE_TITLE.to_string(),
            None,
            0..first.line_index,
            &lines,
        ));
    }

    for (i, heading) in boundaries.iter().enumerate() {
        let end = boundaries
            .get(i + 1)
            .map(|next| next.line_index)
            .unwrap_or(lines.len());
        let title = if heading.text.trim().is_empty() {
            format!("Section {}", i + 1)
        } else {
            heading.text.trim().to_string()
        };
        chapters.push(build_chapter(
            title,
            Some(heading.line_index),
            heading.line_index + 1..end,
            &lines,
        ));
    }

    if !chapters.iter().any(Chapter::has_content) {
        log::debug!(
            "{} headings but no chapter has content, using a single chapter",
            boundaries.len()
        );
        return vec![full_document(text, lines.len())];
    }

    chapters
}

fn build_chapter(
    title: String,
    heading_line: Option<usize>,
    body_lines: std::ops::Range<usize>,
    lines: &[&str],
) -> Chapter {
    let content = lines[body_lines.clone()].join("\n");
    let clean_content = normalize(&content);
    Chapter {
        title,
        content,
        clean_content,
        heading_line,
        body_lines,
    }
}

fn full_document(text: &str, line_count: usize) -> Chapter {
    Chapter {
        title: FULL_DOCUMENT_TITLE.to_string(),
        content: text.to_string(),
        clean_content: normalize(text),
        heading_line: None,
        body_lines: 0..line_count,
    }
}
