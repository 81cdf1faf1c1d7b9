//! Ranked term frequencies across all users.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Occurrence count of one term across the whole corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFrequency {
    /// The search term exactly as stored.
    pub term: String,
    /// Number of history entries holding this term.
    pub count: u64,
}

impl TermFrequency {
    /// Creates a term frequency.
    #[must_use]
    pub fn new(term: impl Into<String>, count: u64) -> Self {
        Self {
            term: term.into(),
            count,
        }
    }
}

/// Trending order: count descending, then term ascending by bytes.
#[must_use]
pub fn compare_frequencies(left: &TermFrequency, right: &TermFrequency) -> Ordering {
    right
        .count
        .cmp(&left.count)
        .then_with(|| left.term.as_bytes().cmp(right.term.as_bytes()))
}

/// Counts every term occurrence and returns the top `limit` in trending order.
#[must_use]
pub fn rank_terms<'a, I>(terms: I, limit: usize) -> Vec<TermFrequency>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for term in terms {
        *counts.entry(term).or_default() += 1;
    }

    let mut ranked: Vec<TermFrequency> = counts
        .into_iter()
        .map(|(term, count)| TermFrequency::new(term, count))
        .collect();
    ranked.sort_by(compare_frequencies);
    ranked.truncate(limit);
    ranked
}

/// Point-in-time view of the most searched terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingSnapshot {
    top_terms: Vec<TermFrequency>,
}

impl TrendingSnapshot {
    /// Wraps already ranked frequencies.
    #[must_use]
    pub fn new(top_terms: Vec<TermFrequency>) -> Self {
        Self { top_terms }
    }

    /// Returns ranked frequencies.
    #[must_use]
    pub fn top_terms(&self) -> &[TermFrequency] {
        &self.top_terms
    }

    /// Returns ranked terms without counts.
    #[must_use]
    pub fn terms(&self) -> Vec<String> {
        self.top_terms.iter().map(|entry| entry.term.clone()).collect()
    }
}
