use std::collections::HashMap;

use async_trait::async_trait;
use picsearch_application::{SearchHistoryRepository, TermFrequencyRepository};
use picsearch_core::AppResult;
use picsearch_domain::{HistoryEntry, HistoryRecord, TermFrequency, rank_terms};
use tokio::sync::RwLock;

/// In-memory search history repository implementation.
///
/// Appends run as one upsert under the write lock, matching the atomicity of
/// the PostgreSQL adapter.
#[derive(Debug, Default)]
pub struct InMemorySearchHistoryRepository {
    records: RwLock<HashMap<String, HistoryRecord>>,
}

impl InMemorySearchHistoryRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SearchHistoryRepository for InMemorySearchHistoryRepository {
    async fn find_history(&self, user_id: &str) -> AppResult<Option<HistoryRecord>> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn append_entry(&self, user_id: &str, entry: HistoryEntry) -> AppResult<()> {
        self.records
            .write()
            .await
            .entry(user_id.to_owned())
            .or_insert_with(|| HistoryRecord::empty(user_id))
            .append(entry);

        Ok(())
    }

    async fn clear_history(&self, user_id: &str) -> AppResult<()> {
        if let Some(record) = self.records.write().await.get_mut(user_id) {
            record.clear();
        }

        Ok(())
    }
}

#[async_trait]
impl TermFrequencyRepository for InMemorySearchHistoryRepository {
    async fn top_terms(&self, limit: usize) -> AppResult<Vec<TermFrequency>> {
        let records = self.records.read().await;
        let terms = records
            .values()
            .flat_map(|record| record.terms().iter().map(String::as_str));

        Ok(rank_terms(terms, limit))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use picsearch_application::{SearchHistoryRepository, TermFrequencyRepository};
    use picsearch_domain::{HistoryEntry, HistoryRecord};

    use super::InMemorySearchHistoryRepository;

    #[tokio::test]
    async fn unknown_user_has_no_record() {
        let repository = InMemorySearchHistoryRepository::new();

        let found = repository.find_history("u-unknown").await;
        assert!(matches!(found, Ok(None)));
    }

    #[tokio::test]
    async fn serial_appends_are_read_back_in_order() {
        let repository = InMemorySearchHistoryRepository::new();
        let start = Utc::now();

        for (offset, term) in ["cat", "Dog ", "cat"].into_iter().enumerate() {
            let observed_at = start + Duration::seconds(offset as i64);
            let appended = repository
                .append_entry("u1", HistoryEntry::new(term, observed_at))
                .await;
            assert!(appended.is_ok());
        }

        let record = repository
            .find_history("u1")
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| HistoryRecord::empty("u1"));
        assert_eq!(record.terms(), ["cat", "Dog ", "cat"].map(str::to_owned));
        assert_eq!(record.observed_at().len(), 3);
        assert_eq!(record.observed_at()[2], start + Duration::seconds(2));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_are_all_kept() {
        let repository = Arc::new(InMemorySearchHistoryRepository::new());

        let tasks: Vec<_> = (0..64)
            .map(|index| {
                let repository = Arc::clone(&repository);
                tokio::spawn(async move {
                    repository
                        .append_entry("u1", HistoryEntry::new(format!("term-{index}"), Utc::now()))
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert!(matches!(task.await, Ok(Ok(()))));
        }

        let record = repository.find_history("u1").await.ok().flatten();
        assert_eq!(record.map(|record| record.len()).unwrap_or(0), 64);
    }

    #[tokio::test]
    async fn clear_keeps_record_and_tolerates_unknown_user() {
        let repository = InMemorySearchHistoryRepository::new();
        assert!(repository.clear_history("nobody").await.is_ok());
        assert!(matches!(repository.find_history("nobody").await, Ok(None)));

        let appended = repository
            .append_entry("u1", HistoryEntry::new("cat", Utc::now()))
            .await;
        assert!(appended.is_ok());
        assert!(repository.clear_history("u1").await.is_ok());

        let record = repository.find_history("u1").await.ok().flatten();
        assert_eq!(record.map(|record| record.len()), Some(0));
    }

    #[tokio::test]
    async fn top_terms_counts_across_users() {
        let repository = InMemorySearchHistoryRepository::new();
        let now = Utc::now();
        let corpus = [
            ("u1", "cat", 3),
            ("u2", "cat", 2),
            ("u2", "dog", 5),
            ("u3", "bird", 3),
            ("u1", "fish", 1),
            ("u3", "bee", 1),
            ("u2", "ant", 1),
        ];
        for (user_id, term, count) in corpus {
            for _ in 0..count {
                let appended = repository
                    .append_entry(user_id, HistoryEntry::new(term, now))
                    .await;
                assert!(appended.is_ok());
            }
        }

        let ranked: Vec<String> = repository
            .top_terms(5)
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|entry| entry.term)
            .collect();
        assert_eq!(ranked, vec!["cat", "dog", "bird", "ant", "bee"]);
    }
}
