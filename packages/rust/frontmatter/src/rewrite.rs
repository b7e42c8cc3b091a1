//! Splicing a keyword list back into a note header.
//!
//! A rewrite is planned as three parts, `before + field + after`, where
//! `before` and `after` are untouched slices of the original document.

use std::sync::LazyLock;

use contextkeys_shared::{ContextKeysError, KeywordSequence, Result};
use regex::Regex;

use crate::FIELD_MARKER;
use crate::codec::serialize;
use crate::locator::{find_keyword_field, locate};

/// A field marker accidentally carried inside a value.
static EMBEDDED_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[Kk]eywords:\s*").expect("embedded marker regex")
});

/// Planned rewrite of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewritePlan<'a> {
    /// Original text up to the field.
    pub before: &'a str,
    /// New field text (`keywords: ...`, plus a line break when inserted).
    pub field: String,
    /// Original text after the replaced field.
    pub after: &'a str,
    /// Whether an existing field was replaced rather than a new one inserted.
    pub replaced: bool,
}

impl RewritePlan<'_> {
    /// Length of the rewritten document.
    pub fn len(&self) -> usize {
        self.before.len() + self.field.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_document(self) -> String {
        let mut out = String::with_capacity(self.len());
        out.push_str(self.before);
        out.push_str(&self.field);
        out.push_str(self.after);
        out
    }
}

/// Normalized field value: `a, b, c,` with exactly one trailing comma.
///
/// An empty sequence produces an empty value.
pub fn field_value(keywords: &KeywordSequence) -> String {
    let joined = serialize(keywords);
    if joined.trim().is_empty() {
        return String::new();
    }

    let mut value = joined.trim_end_matches(',').to_string();
    value.push(',');

    let value = EMBEDDED_MARKER_RE.replace(&value, "");
    let value = value.strip_prefix(',').unwrap_or(&value);
    value.trim_start().to_string()
}

fn field_line(keywords: &KeywordSequence) -> String {
    let value = field_value(keywords);
    if value.is_empty() {
        FIELD_MARKER.to_string()
    } else {
        format!("{FIELD_MARKER} {value}")
    }
}

/// Plan the rewrite of `doc` so its header carries exactly `keywords`.
///
/// An existing `keywords:` field (inline, or vertical with its items) is
/// replaced in place by an inline field. Without one, a new field is inserted
/// right after the opening delimiter. A note without a header is an error.
pub fn plan<'a>(doc: &'a str, keywords: &KeywordSequence) -> Result<RewritePlan<'a>> {
    let span = locate(doc).ok_or(ContextKeysError::NoFrontmatter)?;

    if let Some(existing) = find_keyword_field(doc, &span) {
        return Ok(RewritePlan {
            before: &doc[..existing.start],
            field: field_line(keywords),
            after: &doc[existing.end..],
            replaced: true,
        });
    }

    let newline = span.opening_newline(doc);
    Ok(RewritePlan {
        before: &doc[..span.content_start],
        field: format!("{}{newline}", field_line(keywords)),
        after: &doc[span.content_start..],
        replaced: false,
    })
}

/// Rewrite `doc` so its header carries exactly `keywords`.
pub fn rewrite(doc: &str, keywords: &KeywordSequence) -> Result<String> {
    plan(doc, keywords).map(RewritePlan::into_document)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(items: &[&str]) -> KeywordSequence {
        items.iter().collect()
    }

    /// Remove the first `keywords:` field (and its vertical items) from the header.
    fn without_field(doc: &str) -> String {
        let span = locate(doc).expect("header");
        match find_keyword_field(doc, &span) {
            Some(field) => {
                let mut after = &doc[field.end..];
                after = after
                    .strip_prefix("\r\n")
                    .or_else(|| after.strip_prefix('\n'))
                    .unwrap_or(after);
                format!("{}{}", &doc[..field.start], after)
            }
            None => doc.to_string(),
        }
    }

    #[test]
    fn value_gets_single_trailing_comma() {
        assert_eq!(field_value(&seq(&["a", "b"])), "a, b,");
        assert_eq!(field_value(&seq(&["a", "b,"])), "a, b,");
        assert_eq!(field_value(&seq(&["a,,"])), "a,");
    }

    #[test]
    fn value_strips_embedded_marker_and_leading_comma() {
        assert_eq!(field_value(&seq(&["keywords: a", "b"])), "a, b,");
        assert_eq!(field_value(&seq(&["Keywords:a"])), "a,");
        assert_eq!(field_value(&seq(&[",a", "b"])), "a, b,");
    }

    #[test]
    fn empty_value() {
        assert_eq!(field_value(&KeywordSequence::new()), "");
        assert_eq!(field_line(&KeywordSequence::new()), "keywords:");
    }

    #[test]
    fn replaces_inline_field() {
        let doc = "---\ntitle: x\nkeywords: a, b\n---\nbody";
        let out = rewrite(doc, &seq(&["a", "b", "c", "d"])).unwrap();
        assert_eq!(out, "---\ntitle: x\nkeywords: a, b, c, d,\n---\nbody");
    }

    #[test]
    fn replaces_vertical_field_with_inline() {
        let doc = "---\nkeywords:\n- a\n- b\ntitle: x\n---\nbody";
        let out = rewrite(doc, &seq(&["a", "b", "c"])).unwrap();
        assert_eq!(out, "---\nkeywords: a, b, c,\ntitle: x\n---\nbody");
    }

    #[test]
    fn inserts_field_after_opening_delimiter() {
        let doc = "---\ntitle: x\n---\nbody";
        let plan = plan(doc, &seq(&["c", "d"])).unwrap();
        assert!(!plan.replaced);
        assert_eq!(plan.before, "---\n");
        assert_eq!(plan.after, "title: x\n---\nbody");
        assert_eq!(plan.into_document(), "---\nkeywords: c, d,\ntitle: x\n---\nbody");
    }

    #[test]
    fn inserts_into_empty_header() {
        let out = rewrite("---\n---\nbody", &seq(&["a"])).unwrap();
        assert_eq!(out, "---\nkeywords: a,\n---\nbody");
    }

    #[test]
    fn insert_keeps_crlf_style() {
        let doc = "---\r\ntitle: x\r\n---\r\nbody";
        let out = rewrite(doc, &seq(&["a"])).unwrap();
        assert_eq!(out, "---\r\nkeywords: a,\r\ntitle: x\r\n---\r\nbody");
    }

    #[test]
    fn replace_keeps_crlf_style() {
        let doc = "---\r\nkeywords: old\r\n---\r\nbody";
        let out = rewrite(doc, &seq(&["old", "new"])).unwrap();
        assert_eq!(out, "---\r\nkeywords: old, new,\r\n---\r\nbody");
    }

    #[test]
    fn no_header_is_an_error() {
        let err = rewrite("just body text", &seq(&["a"])).unwrap_err();
        assert!(err.is_no_frontmatter());
    }

    #[test]
    fn body_mentions_of_marker_are_untouched() {
        let doc = "---\ntitle: keywords: inside a value\n---\nkeywords: in body\n";
        let out = rewrite(doc, &seq(&["a"])).unwrap();
        assert_eq!(
            out,
            "---\nkeywords: a,\ntitle: keywords: inside a value\n---\nkeywords: in body\n"
        );
    }

    #[test]
    fn plan_length_matches_output() {
        let docs = [
            "---\ntitle: x\nkeywords: a, b\n---\nbody",
            "---\nkeywords:\n- a\n- b\n---\nbody",
            "---\ntitle: x\n---\nbody",
        ];
        for doc in docs {
            let plan = plan(doc, &seq(&["k1", "k2"])).unwrap();
            let expected = plan.before.len() + plan.field.len() + plan.after.len();
            assert_eq!(plan.len(), expected);
            assert_eq!(plan.into_document().len(), expected);
        }
    }

    #[test]
    fn only_the_field_changes() {
        let docs = [
            "---\ntitle: x\nkeywords: a, b\ndate: today\n---\nbody\nmore body",
            "---\nkeywords:\n- a\n  - b\ntags: [t]\n---\n# Heading\n",
            "---\r\nkeywords: a\r\n---\r\nbody\r\n",
        ];
        for doc in docs {
            let out = rewrite(doc, &seq(&["z", "y"])).unwrap();
            assert_eq!(without_field(&out), without_field(doc), "doc: {doc:?}");
        }
    }

    #[test]
    fn rewrite_is_stable_when_rerun() {
        let doc = "---\nkeywords: a, b,\n---\nbody";
        let once = rewrite(doc, &crate::codec::parse("keywords: a, b,")).unwrap();
        assert_eq!(once, doc);
    }
}
