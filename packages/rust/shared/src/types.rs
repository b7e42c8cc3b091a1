//! Core domain types shared by the frontmatter, generation, and core crates.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// KeywordSequence
// ---------------------------------------------------------------------------

/// Ordered list of keywords as stored in a note header.
///
/// Entries are trimmed and non-empty. Order is insertion order and
/// duplicates are allowed; whether they survive a merge is decided by
/// [`MergePolicy`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordSequence(Vec<String>);

impl KeywordSequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a keyword. Surrounding whitespace is trimmed and blank input is ignored.
    pub fn push(&mut self, keyword: impl AsRef<str>) {
        let trimmed = keyword.as_ref().trim();
        if !trimmed.is_empty() {
            self.0.push(trimmed.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for KeywordSequence {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut seq = Self::new();
        for keyword in iter {
            seq.push(keyword);
        }
        seq
    }
}

impl<S: AsRef<str>> Extend<S> for KeywordSequence {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for keyword in iter {
            self.push(keyword);
        }
    }
}

impl IntoIterator for KeywordSequence {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a KeywordSequence {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for KeywordSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

// ---------------------------------------------------------------------------
// MergePolicy
// ---------------------------------------------------------------------------

/// How stored and generated keywords are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Stored keywords followed by generated ones, duplicates kept.
    #[default]
    Concatenate,
    /// Concatenate, then drop case-insensitive repeats keeping the first spelling.
    Dedupe,
}

impl MergePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concatenate => "concatenate",
            Self::Dedupe => "dedupe",
        }
    }
}
