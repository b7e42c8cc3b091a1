//! Frontmatter keyword handling for Markdown notes.
//!
//! Everything here is a pure text transformation over the raw note:
//! 1. [`locator`] finds the `---` delimited header and the `keywords:` field
//! 2. [`codec`] parses inline / vertical keyword lists and generated text
//! 3. [`merge`] combines stored and generated keywords
//! 4. [`rewrite`] splices the merged list back without touching other bytes

pub mod codec;
pub mod locator;
pub mod merge;
pub mod rewrite;

pub use codec::{extract_generated, parse, serialize, tokens};
pub use locator::{
    FieldSyntax, HeaderSpan, KeywordField, find_keyword_field, has_keyword_field, locate,
};
pub use merge::{merge, merge_with};
pub use rewrite::{RewritePlan, field_value, plan, rewrite};

/// Line that opens and closes the header.
pub const DELIMITER: &str = "---";

/// Prefix of the keyword field line.
pub const FIELD_MARKER: &str = "keywords:";

/// Prefix of one entry in a vertical keyword list.
pub const LIST_ITEM_MARKER: &str = "- ";

// ---------------------------------------------------------------------------
// Line scanning
// ---------------------------------------------------------------------------

/// One line of a document with its byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    /// Offset of the first byte of the line.
    pub start: usize,
    /// Offset just past the line text, before any `\r\n` / `\n`.
    pub end: usize,
    /// Offset of the next line (past the terminator).
    pub next: usize,
    /// Line text without its terminator.
    pub text: &'a str,
}

/// Iterate the lines of `doc`, offsets relative to `base`.
pub(crate) fn lines_from(doc: &str, base: usize) -> impl Iterator<Item = Line<'_>> {
    let mut offset = base;
    doc.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        let text = raw.strip_suffix('\n').unwrap_or(raw);
        let text = text.strip_suffix('\r').unwrap_or(text);
        Line {
            start,
            end: start + text.len(),
            next: offset,
            text,
        }
    })
}

/// Whether a line is a vertical list entry (`- item`, or a bare `-`).
pub(crate) fn is_list_item(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with(LIST_ITEM_MARKER) || trimmed.trim_end() == "-"
}
