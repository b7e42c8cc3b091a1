//! Combining stored and generated keywords.

use std::collections::HashSet;

use contextkeys_shared::{KeywordSequence, MergePolicy};

/// Stored keywords followed by generated ones, order kept, nothing removed.
pub fn merge(existing: &KeywordSequence, incoming: &KeywordSequence) -> KeywordSequence {
    existing.iter().chain(incoming.iter()).collect()
}

/// Merge under an explicit policy.
pub fn merge_with(
    existing: &KeywordSequence,
    incoming: &KeywordSequence,
    policy: MergePolicy,
) -> KeywordSequence {
    let merged = merge(existing, incoming);
    match policy {
        MergePolicy::Concatenate => merged,
        MergePolicy::Dedupe => dedupe(merged),
    }
}

/// Drop case-insensitive repeats, keeping the first spelling and position.
fn dedupe(keywords: KeywordSequence) -> KeywordSequence {
    let mut seen = HashSet::new();
    keywords
        .into_iter()
        .filter(|kw| seen.insert(kw.to_lowercase()))
        .collect()
}
