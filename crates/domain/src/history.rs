//! Per-user search history.
//!
//! A record stores two parallel columns, terms and observation timestamps,
//! mirroring the persisted layout. The columns are index-aligned at all times;
//! a record that cannot satisfy this is rejected as corrupt rather than
//! repaired.

use chrono::{DateTime, Utc};
use picsearch_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// One search observed for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    term: String,
    observed_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Creates a history entry. The term is kept exactly as given.
    #[must_use]
    pub fn new(term: impl Into<String>, observed_at: DateTime<Utc>) -> Self {
        Self {
            term: term.into(),
            observed_at,
        }
    }

    /// Returns the search term.
    #[must_use]
    pub fn term(&self) -> &str {
        self.term.as_str()
    }

    /// Returns when the search happened.
    #[must_use]
    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}

/// Durable search log of a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    user_id: String,
    terms: Vec<String>,
    observed_at: Vec<DateTime<Utc>>,
}

impl HistoryRecord {
    /// Creates a record with no entries.
    #[must_use]
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            terms: Vec::new(),
            observed_at: Vec::new(),
        }
    }

    /// Rebuilds a record from its stored columns.
    ///
    /// Fails with [`AppError::Corruption`] when the columns differ in length.
    pub fn from_columns(
        user_id: impl Into<String>,
        terms: Vec<String>,
        observed_at: Vec<DateTime<Utc>>,
    ) -> AppResult<Self> {
        let user_id = user_id.into();
        if terms.len() != observed_at.len() {
            return Err(AppError::Corruption(format!(
                "history for user '{user_id}' has {} terms but {} timestamps",
                terms.len(),
                observed_at.len()
            )));
        }

        Ok(Self {
            user_id,
            terms,
            observed_at,
        })
    }

    /// Returns the owning user identifier.
    #[must_use]
    pub fn user_id(&self) -> &str {
        self.user_id.as_str()
    }

    /// Returns the term column in chronological order.
    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Returns the timestamp column in chronological order.
    #[must_use]
    pub fn observed_at(&self) -> &[DateTime<Utc>] {
        &self.observed_at
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns true when the record holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Appends one entry to both columns.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.terms.push(entry.term);
        self.observed_at.push(entry.observed_at);
    }

    /// Drops every entry while keeping the record.
    pub fn clear(&mut self) {
        self.terms.clear();
        self.observed_at.clear();
    }

    /// Splits the record into its stored columns.
    #[must_use]
    pub fn into_columns(self) -> (String, Vec<String>, Vec<DateTime<Utc>>) {
        (self.user_id, self.terms, self.observed_at)
    }
}
