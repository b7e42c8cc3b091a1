//! Keyword generation backends.
//!
//! The pipeline only needs "prompt in, free-form text out". The HTTP client
//! for OpenAI-compatible APIs lives in [`openai`]; [`FixedTextGenerator`]
//! replays a stored completion for offline runs and tests.

mod openai;

use std::future::Future;

use contextkeys_shared::Result;

pub use openai::OpenAiGenerator;

/// Maximum number of note characters sent to the backend.
pub const MAX_PROMPT_BODY_CHARS: usize = 12_000;

// ---------------------------------------------------------------------------
// Generator trait
// ---------------------------------------------------------------------------

/// A text-generation backend that answers a keyword prompt.
pub trait KeywordGenerator: Send + Sync {
    /// Short label for logs (model name, "fixed", ...).
    fn name(&self) -> &str;

    /// Submit `prompt` and return the raw completion text.
    ///
    /// An empty string means the backend produced nothing usable; callers
    /// treat that as "no new keywords", not as a failure.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Generator that always answers with the same text.
#[derive(Debug, Clone)]
pub struct FixedTextGenerator {
    text: String,
}

impl FixedTextGenerator {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl KeywordGenerator for FixedTextGenerator {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::debug!(prompt_len = prompt.len(), "replaying fixed completion");
        Ok(self.text.clone())
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// Build the keyword prompt: `prefix` followed by the note text.
pub fn build_prompt(prefix: &str, body: &str) -> String {
    format!("{prefix}{}", truncate_content(body, MAX_PROMPT_BODY_CHARS))
}

/// Truncate content to at most `max_chars` characters.
fn truncate_content(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}
