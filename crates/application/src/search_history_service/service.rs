use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use picsearch_core::{AppError, AppResult, NonEmptyString};
use picsearch_domain::{HistoryEntry, HistoryRecord};
use tracing::{debug, error};

use crate::clock::Clock;
use crate::store_call::bounded;

use super::ports::SearchHistoryRepository;

/// Application service for per-user search history.
#[derive(Clone)]
pub struct SearchHistoryService {
    repository: Arc<dyn SearchHistoryRepository>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl SearchHistoryService {
    /// Creates a new history service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn SearchHistoryRepository>,
        clock: Arc<dyn Clock>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            clock,
            store_timeout,
        }
    }

    /// Returns the user's history.
    ///
    /// A user who never searched yields `AppError::NotFound`.
    pub async fn get(&self, user_id: &str) -> AppResult<HistoryRecord> {
        let found = bounded(
            self.store_timeout,
            "history read",
            self.repository.find_history(user_id),
        )
        .await
        .inspect_err(log_store_failure)?;

        found.ok_or_else(|| {
            debug!(user_id, "no search history recorded yet");
            AppError::NotFound(format!("no history recorded for user '{user_id}'"))
        })
    }

    /// Returns the user's history, treating an absent record as empty.
    pub async fn get_or_empty(&self, user_id: &str) -> AppResult<HistoryRecord> {
        match self.get(user_id).await {
            Ok(record) => Ok(record),
            Err(AppError::NotFound(_)) => Ok(HistoryRecord::empty(user_id)),
            Err(error) => Err(error),
        }
    }

    /// Appends `term` observed at `observed_at`. The term is stored verbatim.
    pub async fn append(
        &self,
        user_id: &str,
        term: &str,
        observed_at: DateTime<Utc>,
    ) -> AppResult<()> {
        bounded(
            self.store_timeout,
            "history append",
            self.repository
                .append_entry(user_id, HistoryEntry::new(term, observed_at)),
        )
        .await
        .inspect_err(log_store_failure)
    }

    /// Appends a validated term stamped with the current time.
    pub async fn record_search(
        &self,
        user_id: &str,
        term: &NonEmptyString,
    ) -> AppResult<HistoryEntry> {
        let observed_at = self.clock.now();
        self.append(user_id, term.as_str(), observed_at).await?;
        Ok(HistoryEntry::new(term.as_str(), observed_at))
    }

    /// Empties the user's history.
    pub async fn clear(&self, user_id: &str) -> AppResult<()> {
        bounded(
            self.store_timeout,
            "history clear",
            self.repository.clear_history(user_id),
        )
        .await
        .inspect_err(log_store_failure)
    }
}

fn log_store_failure(failure: &AppError) {
    if let AppError::Corruption(detail) = failure {
        error!(%detail, "search history failed its integrity check");
    }
}
