use std::io::Read;
use std::path::PathBuf;

use serde::Serialize;
use studypack_core::config::StudyConfig;
use studypack_core::pipeline::prioritize_pages;
use studypack_core::PipelineOutput;

/// Command-line path argument that stands for standard input.
pub const STDIN_ARG: &str = "-";

/// Where the PDF comes from.
#[derive(Debug, Clone)]
pub enum Source {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl Source {
    /// Resolve a command-line path. [`STDIN_ARG`] drains `stdin` into memory.
    pub fn from_arg(path: PathBuf, mut stdin: impl Read) -> std::io::Result<Self> {
        if path.as_os_str() != STDIN_ARG {
            return Ok(Source::Path(path));
        }
        let mut bytes = Vec::new();
        stdin.read_to_end(&mut bytes)?;
        Ok(Source::Bytes(bytes))
    }

    /// Human-readable label used in tables and logs.
    pub fn label(&self) -> String {
        match self {
            Source::Path(path) => path.display().to_string(),
            Source::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

/// Chapters and ranked topics, plus what the PDF said about itself.
///
/// Serializes with the pipeline fields (`raw_text`, `clean_text`,
/// `chapters`, `topics`) at the top level.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    pub source: String,
    pub metadata: pdf::DocumentMetadata,
    #[serde(flatten)]
    pub output: PipelineOutput,
}

/// Bytes or path in, chapters and ranked topics out.
///
/// Blocking: call through `spawn_blocking` from async code.
pub fn extract_and_prioritize(
    source: &Source,
    config: &StudyConfig,
) -> Result<ProcessedDocument, pdf::PdfError> {
    let extracted = match source {
        Source::Path(path) => pdf::extract_pages_from_path(path)?,
        Source::Bytes(bytes) => pdf::extract_pages(bytes)?,
    };

    if extracted.is_blank() {
        log::warn!(
            "{}: no text layer found on any of {} pages",
            source.label(),
            extracted.pages.len()
        );
    }

    let metadata = extracted.metadata;
    let output = prioritize_pages(extracted.pages, config);

    Ok(ProcessedDocument {
        source: source.label(),
        metadata,
        output,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use studypack_core::Weightage;

    #[test]
    fn test_bytes_source_end_to_end() {
        let bytes = fixtures::text_pdf(&[
            &[
                "CHAPTER 1",
                "Every definition and theorem here comes with a proof.",
                "Work each example before the exercise.",
            ],
            &["CHAPTER 2", "A short historical aside."],
        ]);

        let output = extract_and_prioritize(&Source::Bytes(bytes), &StudyConfig::default())
            .unwrap()
            .output;

        assert_eq!(output.chapters.len(), 2);
        assert_eq!(output.chapters[0].title, "CHAPTER 1");
        assert_eq!(output.chapters[1].content, "A short historical aside.");
        assert_eq!(output.topics[0].weightage, Weightage::High);
        assert_eq!(output.topics[1].weightage, Weightage::Low);
    }

    #[test]
    fn test_path_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, fixtures::text_pdf(&[&["Just one paragraph of notes."]])).unwrap();

        let doc =
            extract_and_prioritize(&Source::Path(path.clone()), &StudyConfig::default()).unwrap();

        assert_eq!(doc.source, path.display().to_string());
        assert_eq!(doc.metadata.page_count, 1);
        assert_eq!(doc.output.chapters.len(), 1);
        assert_eq!(doc.output.chapters[0].title, "Full Document");
        assert_eq!(doc.output.raw_text, "Just one paragraph of notes.");
    }

    #[test]
    fn test_non_pdf_bytes_are_rejected() {
        let err = extract_and_prioritize(
            &Source::Bytes(b"plain text, not a pdf".to_vec()),
            &StudyConfig::default(),
        )
        .unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_dash_reads_pdf_from_stdin() {
        let pdf = fixtures::text_pdf(&[&["INTRODUCTION", "Why we study."]]);

        let source = Source::from_arg(PathBuf::from(STDIN_ARG), pdf.as_slice()).unwrap();
        assert!(matches!(&source, Source::Bytes(bytes) if *bytes == pdf));

        let doc = extract_and_prioritize(&source, &StudyConfig::default()).unwrap();
        assert_eq!(doc.source, format!("<{} bytes>", pdf.len()));
        assert_eq!(doc.output.chapters[0].title, "INTRODUCTION");
    }

    #[test]
    fn test_other_paths_leave_stdin_alone() {
        let source = Source::from_arg(PathBuf::from("notes.pdf"), std::io::empty()).unwrap();
        assert!(matches!(source, Source::Path(path) if path == PathBuf::from("notes.pdf")));
    }

    #[test]
    fn test_serialized_document_keeps_pipeline_fields_on_top() {
        let bytes = fixtures::text_pdf(&[&["Plain notes."]]);
        let doc = extract_and_prioritize(&Source::Bytes(bytes), &StudyConfig::default()).unwrap();
        let json = serde_json::to_value(&doc).unwrap();
        for field in ["raw_text", "clean_text", "chapters", "topics", "metadata"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
        assert_eq!(json["topics"][0]["title"], "Full Document");
    }

    #[test]
    fn test_source_label() {
        assert_eq!(Source::Bytes(vec![0; 3]).label(), "<3 bytes>");
        assert_eq!(Source::Path(PathBuf::from("a/b.pdf")).label(), "a/b.pdf");
    }
}
