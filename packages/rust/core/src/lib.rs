//! Core pipeline orchestration for ContextKeys.
//!
//! This crate ties together frontmatter parsing, keyword generation, and
//! note storage into end-to-end workflows (e.g., `tag_documents`).

pub mod pipeline;
pub mod store;
pub mod tagging;

pub use pipeline::{ExistingKeywords, KeywordExtractionPipeline, PipelineOutcome, existing_keywords};
pub use store::{DocumentStore, FsDocumentStore};
pub use tagging::{
    BatchSummary, SilentProgress, TagProgress, TagResult, TaggingOptions, generate_and_insert,
    tag_documents,
};
