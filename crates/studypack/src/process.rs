use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use futures::future::join_all;
use serde::Serialize;
use studypack_core::config::StudyConfig;
use studypack_core::{TopicEntry, Weightage};

use crate::pipeline::{extract_and_prioritize, ProcessedDocument, Source};
use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Parser)]
#[command(name = "process")]
#[command(about = "Rank the chapters of one or more PDFs by study priority")]
pub struct App {
    /// PDF files to process; `-` reads one PDF from stdin
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Include raw text, clean text and chapter contents in the JSON output
    #[arg(long, requires = "json")]
    full: bool,
}

/// Topic listing for one document, without the document text.
#[derive(Debug, Serialize)]
struct TopicSummary<'a> {
    source: &'a str,
    metadata: &'a pdf::DocumentMetadata,
    topics: &'a [TopicEntry],
}

impl<'a> From<&'a ProcessedDocument> for TopicSummary<'a> {
    fn from(doc: &'a ProcessedDocument) -> Self {
        Self {
            source: &doc.source,
            metadata: &doc.metadata,
            topics: &doc.output.topics,
        }
    }
}

/// Run every path through the pipeline concurrently, preserving input order.
pub async fn process_all(
    paths: Vec<PathBuf>,
    config: Arc<StudyConfig>,
) -> Vec<(PathBuf, Result<ProcessedDocument>)> {
    let tasks = paths.into_iter().map(|path| {
        let config = Arc::clone(&config);
        let arg = path.clone();
        async move {
            let result = tokio::task::spawn_blocking(move || -> Result<_, pdf::PdfError> {
                let source = Source::from_arg(arg, std::io::stdin().lock())?;
                extract_and_prioritize(&source, &config)
            })
            .await
            .map_err(|e| eyre!(Error::Generic(format!("Task join error: {e}"))))
            .and_then(|r| r.map_err(|e| eyre!(e)));
            (path, result)
        }
    });

    join_all(tasks).await
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = Arc::new(global.load_config()?);

    if global.verbose {
        eprintln!("Processing {} document(s)...", app.paths.len());
    }

    let total = app.paths.len();
    let results = process_all(app.paths, config).await;

    let mut documents = Vec::with_capacity(total);
    let mut failures = 0;
    for (path, result) in results {
        match result {
            Ok(doc) => documents.push(doc),
            Err(err) => {
                failures += 1;
                eprintln!("{} {}: {}", "error:".red().bold(), path.display(), err);
            }
        }
    }

    if app.json {
        let json = if app.full {
            serde_json::to_string_pretty(&documents)?
        } else {
            let summaries: Vec<TopicSummary> = documents.iter().map(TopicSummary::from).collect();
            serde_json::to_string_pretty(&summaries)?
        };
        println!("{json}");
    } else {
        for doc in &documents {
            print_document(doc, global.verbose);
        }
    }

    if failures > 0 {
        return Err(eyre!("{failures} of {total} document(s) failed"));
    }

    Ok(())
}

fn print_document(doc: &ProcessedDocument, verbose: bool) {
    let pages = doc.metadata.page_count;
    match &doc.metadata.title {
        Some(title) => println!("\n{} - {} ({pages} pages)\n", doc.source.bold(), title),
        None => println!("\n{} ({pages} pages)\n", doc.source.bold()),
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "#".bold().cyan(),
        "Chapter".bold().cyan(),
        "Weightage".bold().cyan(),
        "Score".bold().cyan(),
        "Raw".bold().cyan()
    ]);

    for (i, topic) in doc.output.topics.iter().enumerate() {
        table.add_row(prettytable::row![
            (i + 1).to_string().bright_black(),
            topic.chapter_title.bright_white(),
            colored_weightage(topic.weightage),
            format!("{:.2}", topic.normalized_score),
            format!("{:.4}", topic.raw_score).bright_black()
        ]);
    }

    table.printstd();

    if verbose {
        for topic in &doc.output.topics {
            if !topic.snippet.is_empty() {
                println!("\n{}\n{}", topic.chapter_title.bold(), topic.snippet);
            }
        }
    }
}

fn colored_weightage(weightage: Weightage) -> colored::ColoredString {
    let label = weightage.to_string();
    match weightage {
        Weightage::High => label.red().bold(),
        Weightage::Medium => label.yellow(),
        Weightage::Low => label.green(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures;

    #[tokio::test]
    async fn test_process_all_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.pdf");
        let second = dir.path().join("second.pdf");
        std::fs::write(&first, fixtures::text_pdf(&[&["ALGEBRA", "Groups and rings."]])).unwrap();
        std::fs::write(&second, fixtures::text_pdf(&[&["GEOMETRY", "Lines and circles."]]))
            .unwrap();

        let results = process_all(
            vec![first.clone(), second.clone()],
            Arc::new(StudyConfig::default()),
        )
        .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, first);
        assert_eq!(results[1].0, second);

        let doc = results[0].1.as_ref().unwrap();
        assert_eq!(doc.output.chapters[0].title, "ALGEBRA");
        let doc = results[1].1.as_ref().unwrap();
        assert_eq!(doc.output.chapters[0].title, "GEOMETRY");
    }

    #[tokio::test]
    async fn test_one_bad_file_does_not_sink_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.pdf");
        let bad = dir.path().join("bad.pdf");
        std::fs::write(&good, fixtures::text_pdf(&[&["Plain notes."]])).unwrap();
        std::fs::write(&bad, b"not a pdf").unwrap();

        let results = process_all(vec![bad, good], Arc::new(StudyConfig::default())).await;

        assert!(results[0].1.is_err());
        assert!(results[1].1.is_ok());
    }

    #[test]
    fn test_summary_omits_document_text() {
        let doc = ProcessedDocument {
            source: "notes.pdf".to_string(),
            metadata: pdf::DocumentMetadata::default(),
            output: studypack_core::pipeline::prioritize_pages(
                vec!["INTRO\nsecret body text".to_string()],
                &StudyConfig::default(),
            ),
        };

        let json = serde_json::to_value(TopicSummary::from(&doc)).unwrap();
        assert_eq!(json["source"], "notes.pdf");
        assert_eq!(json["topics"][0]["title"], "INTRO");
        assert!(json.get("raw_text").is_none());
        assert!(json.get("chapters").is_none());
    }
}
