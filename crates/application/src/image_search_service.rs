//! Image search proxy that records what signed-in users look for.

use std::sync::Arc;

use async_trait::async_trait;
use picsearch_core::{AppError, AppResult, NonEmptyString};
use serde_json::Value;
use tracing::warn;

use crate::search_history_service::SearchHistoryService;

/// Term used for guest browsing and the signed-in landing page.
pub const GUEST_SEARCH_TERM: &str = "random";

/// Port for the external photo search provider.
#[async_trait]
pub trait ImageSearchProvider: Send + Sync {
    /// Returns the provider's result page for `query` unchanged.
    async fn search_photos(&self, query: &str, page: u32) -> AppResult<Value>;
}

/// Application service in front of the image search provider.
#[derive(Clone)]
pub struct ImageSearchService {
    provider: Arc<dyn ImageSearchProvider>,
    history: SearchHistoryService,
}

impl ImageSearchService {
    /// Creates a new image search service.
    #[must_use]
    pub fn new(provider: Arc<dyn ImageSearchProvider>, history: SearchHistoryService) -> Self {
        Self { provider, history }
    }

    /// Searches for `raw_term` on behalf of `user_id`.
    ///
    /// The term is appended to the user's history exactly as given, unless it
    /// is the guest term. The provider receives the trimmed, lower-cased form.
    /// A failed append is logged and does not fail the search.
    pub async fn search(&self, user_id: &str, raw_term: &str, page: u32) -> AppResult<Value> {
        let term = NonEmptyString::new(raw_term)?;
        let page = validate_page(page)?;

        if term.as_str() != GUEST_SEARCH_TERM {
            if let Err(error) = self.history.record_search(user_id, &term).await {
                warn!(user_id, %error, "failed to record search history");
            }
        }

        self.provider
            .search_photos(&normalize_query(term.as_str()), page)
            .await
    }

    /// Returns the guest landing page results.
    pub async fn search_as_guest(&self, page: u32) -> AppResult<Value> {
        let page = validate_page(page)?;
        self.provider.search_photos(GUEST_SEARCH_TERM, page).await
    }
}

/// Normalizes a term before it is sent to the provider.
#[must_use]
pub fn normalize_query(term: &str) -> String {
    term.trim().to_lowercase()
}

fn validate_page(page: u32) -> AppResult<u32> {
    if page == 0 {
        return Err(AppError::Validation("page must start at 1".to_owned()));
    }

    Ok(page)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use picsearch_core::{AppError, AppResult};
    use picsearch_domain::{HistoryEntry, HistoryRecord};
    use serde_json::{Value, json};

    use super::{GUEST_SEARCH_TERM, ImageSearchProvider, ImageSearchService, normalize_query};
    use crate::clock::Clock;
    use crate::search_history_service::{SearchHistoryRepository, SearchHistoryService};

    struct StaticClock;

    impl Clock for StaticClock {
        fn now(&self) -> DateTime<Utc> {
            DateTime::<Utc>::UNIX_EPOCH
        }
    }

    #[derive(Default)]
    struct RecordingProvider {
        queries: Mutex<Vec<(String, u32)>>,
    }

    #[async_trait]
    impl ImageSearchProvider for RecordingProvider {
        async fn search_photos(&self, query: &str, page: u32) -> AppResult<Value> {
            self.queries
                .lock()
                .map_err(|error| AppError::Internal(format!("failed to lock provider: {error}")))?
                .push((query.to_owned(), page));
            Ok(json!({"results": [], "query": query}))
        }
    }

    #[derive(Default)]
    struct MemoryHistory {
        records: Mutex<HashMap<String, HistoryRecord>>,
        fail_appends: bool,
    }

    #[async_trait]
    impl SearchHistoryRepository for MemoryHistory {
        async fn find_history(&self, user_id: &str) -> AppResult<Option<HistoryRecord>> {
            Ok(self
                .records
                .lock()
                .map_err(|error| AppError::Internal(format!("failed to lock history: {error}")))?
                .get(user_id)
                .cloned())
        }

        async fn append_entry(&self, user_id: &str, entry: HistoryEntry) -> AppResult<()> {
            if self.fail_appends {
                return Err(AppError::Unavailable("store offline".to_owned()));
            }
            self.records
                .lock()
                .map_err(|error| AppError::Internal(format!("failed to lock history: {error}")))?
                .entry(user_id.to_owned())
                .or_insert_with(|| HistoryRecord::empty(user_id))
                .append(entry);
            Ok(())
        }

        async fn clear_history(&self, _user_id: &str) -> AppResult<()> {
            Ok(())
        }
    }

    fn build(history: Arc<MemoryHistory>) -> (ImageSearchService, Arc<RecordingProvider>) {
        let provider = Arc::new(RecordingProvider::default());
        let history_service =
            SearchHistoryService::new(history, Arc::new(StaticClock), Duration::from_secs(1));
        (
            ImageSearchService::new(provider.clone(), history_service),
            provider,
        )
    }

    fn recorded_terms(history: &MemoryHistory, user_id: &str) -> Vec<String> {
        history
            .records
            .lock()
            .ok()
            .and_then(|records| records.get(user_id).map(|record| record.terms().to_vec()))
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn stores_raw_term_and_queries_normalized_term() {
        let history = Arc::new(MemoryHistory::default());
        let (service, provider) = build(history.clone());

        for term in ["cat", "Dog ", "cat"] {
            assert!(service.search("u1", term, 1).await.is_ok());
        }

        assert_eq!(recorded_terms(&history, "u1"), vec!["cat", "Dog ", "cat"]);
        let queries = provider
            .queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default();
        assert_eq!(queries[1], ("dog".to_owned(), 1));
    }

    #[tokio::test]
    async fn guest_term_is_not_recorded() {
        let history = Arc::new(MemoryHistory::default());
        let (service, _provider) = build(history.clone());

        assert!(service.search("u1", GUEST_SEARCH_TERM, 2).await.is_ok());
        assert!(recorded_terms(&history, "u1").is_empty());
    }

    #[tokio::test]
    async fn blank_term_and_page_zero_are_rejected() {
        let (service, provider) = build(Arc::new(MemoryHistory::default()));

        assert!(matches!(
            service.search("u1", "   ", 1).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.search_as_guest(0).await,
            Err(AppError::Validation(_))
        ));
        let calls = provider.queries.lock().map(|q| q.len()).unwrap_or(0);
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn history_failure_does_not_fail_search() {
        let history = Arc::new(MemoryHistory {
            fail_appends: true,
            ..MemoryHistory::default()
        });
        let (service, _provider) = build(history);

        assert!(service.search("u1", "cat", 1).await.is_ok());
    }

    #[test]
    fn normalize_query_trims_and_lowercases() {
        assert_eq!(normalize_query("  Sunset Beach "), "sunset beach");
    }
}
