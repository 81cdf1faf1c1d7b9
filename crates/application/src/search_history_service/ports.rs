use async_trait::async_trait;
use picsearch_core::AppResult;
use picsearch_domain::{HistoryEntry, HistoryRecord};

/// Repository port for per-user search history.
#[async_trait]
pub trait SearchHistoryRepository: Send + Sync {
    /// Returns the user's record, or `None` if the user never searched.
    async fn find_history(&self, user_id: &str) -> AppResult<Option<HistoryRecord>>;

    /// Appends one entry, creating the record when absent.
    ///
    /// Must be a single store-side operation: concurrent calls for the same
    /// user each add exactly one entry and none may be lost.
    async fn append_entry(&self, user_id: &str, entry: HistoryEntry) -> AppResult<()>;

    /// Empties the user's entries. Succeeds when no record exists.
    async fn clear_history(&self, user_id: &str) -> AppResult<()>;
}
