//! Header and keyword-field location.
//!
//! The header is found by a three-state machine driven one line at a time:
//!
//! | state          | line is `---`              | any other line   |
//! |----------------|----------------------------|------------------|
//! | `BeforeHeader` | → `InHeader`               | → `NoHeader`     |
//! | `InHeader`     | → `AfterHeader(span)`      | stay             |
//! | terminal       | stay                       | stay             |
//!
//! Running out of lines in `BeforeHeader` or `InHeader` means there is no
//! header: an unterminated block is treated the same as a missing one.

use std::ops::Range;

use crate::{DELIMITER, FIELD_MARKER, Line, is_list_item, lines_from};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Byte range of a note header, delimiters included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSpan {
    /// Start of the opening delimiter line (always 0).
    pub start: usize,
    /// End of the opening `---` text, before its line terminator.
    pub opening_end: usize,
    /// First byte after the opening delimiter line.
    pub content_start: usize,
    /// Start of the closing delimiter line.
    pub content_end: usize,
    /// First byte after the closing delimiter line.
    pub end: usize,
}

impl HeaderSpan {
    /// Half-open range covering the whole header.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Header lines between the two delimiters.
    pub fn content<'a>(&self, doc: &'a str) -> &'a str {
        &doc[self.content_start..self.content_end]
    }

    /// Line terminator used by the opening delimiter (`\n` or `\r\n`).
    pub fn opening_newline<'a>(&self, doc: &'a str) -> &'a str {
        &doc[self.opening_end..self.content_start]
    }

    /// Everything after the header.
    pub fn body<'a>(&self, doc: &'a str) -> &'a str {
        &doc[self.end..]
    }
}

/// Surface syntax of a located keyword field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSyntax {
    /// `keywords: a, b, c`
    Inline,
    /// `keywords:` followed by `- a` lines.
    Vertical,
}

/// The `keywords:` field inside a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordField {
    /// Start of the `keywords:` line.
    pub start: usize,
    /// End of the field's last line, before its terminator.
    pub end: usize,
    pub syntax: FieldSyntax,
}

impl KeywordField {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Raw field text, marker included.
    pub fn text<'a>(&self, doc: &'a str) -> &'a str {
        &doc[self.start..self.end]
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocatorState {
    BeforeHeader,
    InHeader { opening_end: usize, content_start: usize },
    AfterHeader(HeaderSpan),
    NoHeader,
}

impl LocatorState {
    fn step(self, line: &Line<'_>) -> Self {
        let delimiter = line.text == DELIMITER;
        match self {
            Self::BeforeHeader if delimiter => Self::InHeader {
                opening_end: line.end,
                content_start: line.next,
            },
            Self::BeforeHeader => Self::NoHeader,
            Self::InHeader {
                opening_end,
                content_start,
            } if delimiter => Self::AfterHeader(HeaderSpan {
                start: 0,
                opening_end,
                content_start,
                content_end: line.start,
                end: line.next,
            }),
            other => other,
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::AfterHeader(_) | Self::NoHeader)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Find the header of `doc`, or `None` when the note has no complete header.
pub fn locate(doc: &str) -> Option<HeaderSpan> {
    let mut state = LocatorState::BeforeHeader;
    for line in lines_from(doc, 0) {
        state = state.step(&line);
        if state.is_terminal() {
            break;
        }
    }

    match state {
        LocatorState::AfterHeader(span) => Some(span),
        _ => None,
    }
}

/// Whether a line inside the header starts with `keywords:`.
pub fn has_keyword_field(doc: &str, span: &HeaderSpan) -> bool {
    find_keyword_field(doc, span).is_some()
}

/// Locate the first `keywords:` field inside the header.
///
/// A marker line with an empty value absorbs the list-item lines directly
/// below it and is reported as [`FieldSyntax::Vertical`]. A marker line that
/// already carries a value is a single-line inline field.
pub fn find_keyword_field(doc: &str, span: &HeaderSpan) -> Option<KeywordField> {
    let mut lines = lines_from(span.content(doc), span.content_start);

    let marker = lines.by_ref().find(|line| line.text.starts_with(FIELD_MARKER))?;
    let value = &marker.text[FIELD_MARKER.len()..];

    if !value.trim().is_empty() {
        return Some(KeywordField {
            start: marker.start,
            end: marker.end,
            syntax: FieldSyntax::Inline,
        });
    }

    let mut end = marker.end;
    let mut syntax = FieldSyntax::Inline;
    for line in lines.take_while(|line| is_list_item(line.text)) {
        end = line.end;
        syntax = FieldSyntax::Vertical;
    }

    Some(KeywordField {
        start: marker.start,
        end,
        syntax,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_simple_header() {
        let doc = "---\ntitle: x\n---\nbody";
        let span = locate(doc).expect("header");
        assert_eq!(span.range(), 0..17);
        assert_eq!(span.content(doc), "title: x\n");
        assert_eq!(span.body(doc), "body");
        assert_eq!(span.opening_newline(doc), "\n");
    }

    #[test]
    fn empty_header_is_still_a_header() {
        let doc = "---\n---\nbody";
        let span = locate(doc).expect("header");
        assert_eq!(span.content(doc), "");
        assert_eq!(span.body(doc), "body");
    }

    #[test]
    fn header_must_open_on_first_line() {
        assert!(locate("\n---\ntitle: x\n---\n").is_none());
        assert!(locate("just body text").is_none());
        assert!(locate("").is_none());
    }

    #[test]
    fn opening_line_must_match_exactly() {
        assert!(locate("----\ntitle: x\n---\n").is_none());
        assert!(locate("--- \ntitle: x\n---\n").is_none());
    }

    #[test]
    fn unterminated_header_is_absent() {
        assert!(locate("---\ntitle: x\nno closing line").is_none());
        assert!(locate("---").is_none());
    }

    #[test]
    fn closing_delimiter_at_end_of_input() {
        let doc = "---\ntitle: x\n---";
        let span = locate(doc).expect("header");
        assert_eq!(span.end, doc.len());
        assert_eq!(span.body(doc), "");
    }

    #[test]
    fn later_delimiters_belong_to_body() {
        let doc = "---\na: 1\n---\nbody\n---\nmore\n";
        let span = locate(doc).expect("header");
        assert_eq!(span.body(doc), "body\n---\nmore\n");
    }

    #[test]
    fn crlf_header() {
        let doc = "---\r\ntitle: x\r\n---\r\nbody";
        let span = locate(doc).expect("header");
        assert_eq!(span.opening_newline(doc), "\r\n");
        assert_eq!(span.body(doc), "body");
    }

    #[test]
    fn locate_is_repeatable() {
        let doc = "---\nkeywords: a\n---\nbody";
        assert_eq!(locate(doc), locate(doc));
    }

    #[test]
    fn finds_inline_field() {
        let doc = "---\ntitle: x\nkeywords: a, b\n---\nbody";
        let span = locate(doc).expect("header");
        let field = find_keyword_field(doc, &span).expect("field");
        assert_eq!(field.syntax, FieldSyntax::Inline);
        assert_eq!(field.text(doc), "keywords: a, b");
        assert!(has_keyword_field(doc, &span));
    }

    #[test]
    fn finds_vertical_field() {
        let doc = "---\nkeywords:\n- a\n  - b\ntitle: x\n---\nbody";
        let span = locate(doc).expect("header");
        let field = find_keyword_field(doc, &span).expect("field");
        assert_eq!(field.syntax, FieldSyntax::Vertical);
        assert_eq!(field.text(doc), "keywords:\n- a\n  - b");
    }

    #[test]
    fn empty_field_without_items_is_inline() {
        let doc = "---\nkeywords:\ntitle: x\n---\n";
        let span = locate(doc).expect("header");
        let field = find_keyword_field(doc, &span).expect("field");
        assert_eq!(field.syntax, FieldSyntax::Inline);
        assert_eq!(field.text(doc), "keywords:");
    }

    #[test]
    fn field_marker_is_case_sensitive_prefix() {
        let doc = "---\nKeywords: a\n  keywords: b\nmy_keywords: c\n---\n";
        let span = locate(doc).expect("header");
        assert!(!has_keyword_field(doc, &span));
    }

    #[test]
    fn field_in_body_is_ignored() {
        let doc = "---\ntitle: x\n---\nkeywords: not, metadata\n";
        let span = locate(doc).expect("header");
        assert!(find_keyword_field(doc, &span).is_none());
    }

    #[test]
    fn vertical_field_stops_at_closing_delimiter() {
        let doc = "---\nkeywords:\n- a\n---\n- body item\n";
        let span = locate(doc).expect("header");
        let field = find_keyword_field(doc, &span).expect("field");
        assert_eq!(field.text(doc), "keywords:\n- a");
    }
}
