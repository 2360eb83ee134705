//! Core library for studypack
//!
//! This crate implements the **Functional Core** of the studypack application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The studypack project uses a three-crate architecture:
//!
//! - **`studypack_core`** (this crate): Pure text transformations with zero I/O
//! - **`pdf`**: Turns PDF bytes into ordered page strings
//! - **`studypack`**: I/O operations, session bookkeeping and orchestration (the Imperative Shell)
//!
//! All functions in this crate are deterministic and total: any string input,
//! including the empty string, produces a well-formed result.
//!
//! # Module Organization
//!
//! - [`normalize`]: Canonicalizes extracted text (whitespace, bullets, ligatures)
//! - [`headings`]: Flags lines that look like chapter headings
//! - [`segment`]: Slices the normalized document into chapters
//! - [`score`]: TF-IDF plus keyword boost, normalized and bucketed into tiers
//! - [`pipeline`]: Runs the stages above in order
//! - [`config`]: Tunables loaded from TOML
//! - [`types`]: Shared domain models
//!
//! # Example Usage
//!
//! ```rust
//! use studypack_core::{config::StudyConfig, pipeline::prioritize_pages};
//!
//! let pages = vec!["CHAPTER 1\nA theorem and its proof.".to_string()];
//! let output = prioritize_pages(pages, &StudyConfig::default());
//!
//! assert_eq!(output.chapters.len(), 1);
//! assert_eq!(output.topics[0].chapter_title, "CHAPTER 1");
//! ```

pub mod config;
pub mod headings;
pub mod normalize;
pub mod pipeline;
pub mod score;
pub mod segment;
pub mod types;

pub use types::*;
