//! Keyword list parsing and serialization.
//!
//! Two surface syntaxes are understood:
//! - inline: `keywords: a, b, c`
//! - vertical: `keywords:` followed by one `- item` line per keyword
//!
//! Generated text gets an extra normalization pass (lower-casing, emphasis
//! and bullet stripping) before the field marker is looked for.

use std::sync::LazyLock;

use contextkeys_shared::KeywordSequence;
use regex::Regex;

use crate::{FIELD_MARKER, LIST_ITEM_MARKER, is_list_item};

/// Matches a Markdown bullet or numbered list entry and captures its text.
static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*+]|\d+[.)])(?:\s+(.*))?$").expect("bullet regex")
});

// ---------------------------------------------------------------------------
// Field parsing
// ---------------------------------------------------------------------------

/// Split a raw field into keyword tokens without dropping interior blanks.
///
/// Inline fields keep the empty piece between two adjacent commas so the
/// caller can see the malformed separator; a trailing comma or an empty value
/// contributes nothing. Vertical fields yield one token per non-blank item.
pub fn tokens(field_text: &str) -> Vec<String> {
    let value = field_text.strip_prefix(FIELD_MARKER).unwrap_or(field_text);

    if value.lines().count() >= 2 {
        return value
            .lines()
            .filter(|line| is_list_item(line))
            .map(|line| clean_token(strip_item_marker(line)))
            .filter(|token| !token.is_empty())
            .collect();
    }

    let mut pieces: Vec<String> = value.split(',').map(clean_token).collect();
    if pieces.last().is_some_and(String::is_empty) {
        pieces.pop();
    }
    pieces
}

/// Parse a raw field into a [`KeywordSequence`], dropping empty tokens.
pub fn parse(field_text: &str) -> KeywordSequence {
    tokens(field_text).into_iter().collect()
}

/// Join keywords in inline syntax (`a, b, c`), without the field marker.
pub fn serialize(keywords: &KeywordSequence) -> String {
    keywords.as_slice().join(", ")
}

/// Remove the leading `- ` (or bare `-`) of a vertical list line.
fn strip_item_marker(line: &str) -> &str {
    let trimmed = line.trim_start();
    trimmed
        .strip_prefix(LIST_ITEM_MARKER)
        .or_else(|| trimmed.strip_prefix('-'))
        .unwrap_or(trimmed)
}

/// Trim a token and drop any marker embedded in it.
///
/// Removing one marker can join its neighbours into a new one (`a -- b`), so
/// removal repeats until neither marker is left. Tokens without markers come
/// back trimmed and otherwise untouched.
fn clean_token(piece: &str) -> String {
    let mut token = piece.trim().to_string();
    while let Some(marker) = [FIELD_MARKER, LIST_ITEM_MARKER]
        .into_iter()
        .find(|marker| token.contains(marker))
    {
        token = token.replacen(marker, "", 1).trim().to_string();
    }
    token
}

// ---------------------------------------------------------------------------
// Generated text
// ---------------------------------------------------------------------------

/// Pull the keyword list out of free-form generated text.
///
/// The first line whose normalized form starts with `keywords:` is the field.
/// A value on that line is parsed inline; otherwise the bullet lines right
/// below it are parsed as a vertical list. Text without a recognizable field
/// yields an empty sequence.
pub fn extract_generated(text: &str) -> KeywordSequence {
    let lines: Vec<&str> = text.lines().collect();

    for (idx, line) in lines.iter().enumerate() {
        let normalized = normalize_generated_line(line);
        let Some(value) = normalized.strip_prefix(FIELD_MARKER) else {
            continue;
        };

        if !value.trim().is_empty() {
            tracing::debug!(value = value.trim(), "generated keywords in inline syntax");
            return parse(value);
        }

        let mut field = String::from(FIELD_MARKER);
        for next in &lines[idx + 1..] {
            if next.trim().is_empty() {
                continue;
            }
            let Some(caps) = BULLET_RE.captures(next) else {
                break;
            };
            let item = caps.get(1).map_or("", |m| m.as_str());
            field.push('\n');
            field.push_str(LIST_ITEM_MARKER);
            field.push_str(&normalize_generated_item(item));
        }

        tracing::debug!(field = %field, "generated keywords in vertical syntax");
        return parse(&field);
    }

    KeywordSequence::new()
}

/// Lower-case a line and drop leading bullets and emphasis asterisks.
fn normalize_generated_line(line: &str) -> String {
    let lowered = line.to_lowercase();
    let stripped =
        lowered.trim_start_matches(|c: char| c == '-' || c == '*' || c.is_whitespace());
    stripped.replace('*', "")
}

fn normalize_generated_item(item: &str) -> String {
    item.to_lowercase().replace('*', "")
}
