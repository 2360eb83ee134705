use crate::config::StudyConfig;
use crate::headings::detect_headings;
use crate::score::score_chapters;
use crate::segment::segment;
use crate::types::{Document, PipelineOutput};

/// Run the text half of the pipeline over already-extracted pages.
///
/// Normalizes the joined pages, finds headings, segments the document into
/// chapters and scores the complete chapter sequence.
pub fn prioritize_pages(pages: Vec<String>, config: &StudyConfig) -> PipelineOutput {
    prioritize_document(Document::from_pages(pages), config)
}

pub fn prioritize_document(document: Document, config: &StudyConfig) -> PipelineOutput {
    let lines: Vec<&str> = document.clean_text.split('\n').collect();
    let candidates = detect_headings(&lines, &config.headings);
    let chapters = segment(&document.clean_text, &candidates);
    let topics = score_chapters(&chapters, &config.scoring);

    log::info!(
        "prioritized {} pages into {} chapters",
        document.raw_pages.len(),
        chapters.len()
    );

    PipelineOutput {
        raw_text: document.raw_text,
        clean_text: document.clean_text,
        chapters,
        topics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Weightage, FULL_DOCUMENT_TITLE};

    #[test]
    fn test_empty_document() {
        let output = prioritize_pages(Vec::new(), &StudyConfig::default());
        assert_eq!(output.raw_text, "");
        assert_eq!(output.chapters.len(), 1);
        assert_eq!(output.chapters[0].title, FULL_DOCUMENT_TITLE);
        assert_eq!(output.chapters[0].content, "");
        assert_eq!(output.topics.len(), 1);
        assert_eq!(output.topics[0].raw_score, 0.0);
        assert_eq!(output.topics[0].normalized_score, 0.5);
        assert_eq!(output.topics[0].weightage, Weightage::Medium);
    }

    #[test]
    fn test_blank_pages_behave_like_empty_document() {
        let output = prioritize_pages(vec![String::new(), "  ".into()], &StudyConfig::default());
        assert_eq!(output.raw_text, "\n  ");
        assert_eq!(output.clean_text, "");
        assert_eq!(output.chapters.len(), 1);
        assert_eq!(output.topics[0].weightage, Weightage::Medium);
    }

    #[test]
    fn test_chapters_span_pages() {
        let pages = vec![
            "CHAPTER 1\nlimits describe the value a function approaches.".to_string(),
            "each definition here is important for the exam.\nCHAPTER 2\nseries add terms."
                .to_string(),
        ];
        let output = prioritize_pages(pages, &StudyConfig::default());

        assert_eq!(output.chapters.len(), 2);
        assert_eq!(
            output.chapters[0].content,
            "limits describe the value a function approaches.\neach definition here is important for the exam."
        );
        assert_eq!(output.chapters[1].content, "series add terms.");

        assert_eq!(output.topics.len(), 2);
        assert_eq!(output.topics[0].chapter_title, "CHAPTER 1");
        assert_eq!(output.topics[0].weightage, Weightage::High);
        assert_eq!(output.topics[1].weightage, Weightage::Low);
    }

    #[test]
    fn test_raw_text_is_untouched() {
        let pages = vec!["\u{2022}  item\u{00A0}one".to_string()];
        let output = prioritize_pages(pages, &StudyConfig::default());
        assert_eq!(output.raw_text, "\u{2022}  item\u{00A0}one");
        assert_eq!(output.clean_text, "- item one");
    }

    #[test]
    fn test_topics_follow_chapter_order() {
        let text = "INTRODUCTION\nwhy we study.\nMETHODS\nhow we study.\nRESULTS\nwhat we found.";
        let output = prioritize_pages(vec![text.to_string()], &StudyConfig::default());
        let chapter_titles: Vec<&str> = output.chapters.iter().map(|c| c.title.as_str()).collect();
        let topic_titles: Vec<&str> = output
            .topics
            .iter()
            .map(|t| t.chapter_title.as_str())
            .collect();
        assert_eq!(chapter_titles, vec!["INTRODUCTION", "METHODS", "RESULTS"]);
        assert_eq!(chapter_titles, topic_titles);
    }
}
