//! Keyword extraction pipeline: header → existing keywords → generated
//! keywords → merge → rewritten document.
//!
//! Everything in this module is synchronous and free of I/O; the async
//! driver in [`crate::tagging`] feeds it text and persists the result.

use contextkeys_frontmatter as frontmatter;
use contextkeys_frontmatter::{FIELD_MARKER, HeaderSpan};
use contextkeys_shared::{ContextKeysError, KeywordSequence, MergePolicy, Result};
use tracing::{debug, warn};

/// Everything the pipeline derived for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    /// Keywords already stored in the header.
    pub existing: KeywordSequence,
    /// Keywords parsed from the generated text.
    pub incoming: KeywordSequence,
    /// What is written back.
    pub merged: KeywordSequence,
    /// Full rewritten document.
    pub document: String,
}

impl PipelineOutcome {
    /// Whether the rewritten text differs from `original`.
    pub fn changed(&self, original: &str) -> bool {
        self.document != original
    }
}

/// Header, keyword field, and stored keywords of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingKeywords {
    pub header: HeaderSpan,
    pub has_field: bool,
    pub keywords: KeywordSequence,
}

/// Locate the header and parse the keywords it already carries.
///
/// Fails with [`ContextKeysError::NoFrontmatter`] when there is no header. A
/// missing or unparseable field yields an empty sequence.
pub fn existing_keywords(doc: &str) -> Result<ExistingKeywords> {
    let header = frontmatter::locate(doc).ok_or(ContextKeysError::NoFrontmatter)?;

    let Some(field) = frontmatter::find_keyword_field(doc, &header) else {
        return Ok(ExistingKeywords {
            header,
            has_field: false,
            keywords: KeywordSequence::new(),
        });
    };

    let text = field.text(doc);
    let keywords = frontmatter::parse(text);
    if keywords.is_empty() && !text[FIELD_MARKER.len()..].trim().is_empty() {
        warn!(field = text, "keywords field has no usable entries, treating as empty");
    }

    Ok(ExistingKeywords {
        header,
        has_field: true,
        keywords,
    })
}

/// The pure locate → parse → merge → rewrite pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractionPipeline {
    policy: MergePolicy,
}

impl KeywordExtractionPipeline {
    pub fn new(policy: MergePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Return `doc` with its keyword field set to stored + generated keywords.
    pub fn run(&self, doc: &str, generated: &str) -> Result<String> {
        self.run_detailed(doc, generated).map(|outcome| outcome.document)
    }

    /// Like [`run`](Self::run), also reporting the intermediate keyword lists.
    ///
    /// When both lists are empty there is nothing to record and the document
    /// comes back unchanged.
    pub fn run_detailed(&self, doc: &str, generated: &str) -> Result<PipelineOutcome> {
        let existing = existing_keywords(doc)?.keywords;

        let incoming = frontmatter::extract_generated(generated);
        if incoming.is_empty() {
            warn!("generated text has no keywords, keeping stored keywords");
        }

        debug!(old = %existing, new = %incoming, "keywords parsed");

        let merged = frontmatter::merge_with(&existing, &incoming, self.policy);
        let document = if merged.is_empty() {
            doc.to_string()
        } else {
            frontmatter::rewrite(doc, &merged)?
        };

        Ok(PipelineOutcome {
            existing,
            incoming,
            merged,
            document,
        })
    }
}
