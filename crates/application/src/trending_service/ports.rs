use async_trait::async_trait;
use picsearch_core::AppResult;
use picsearch_domain::TermFrequency;

/// Read-only port over every stored history entry.
#[async_trait]
pub trait TermFrequencyRepository: Send + Sync {
    /// Counts each term across all records and returns the `limit` most
    /// frequent, ordered by count descending then term ascending (byte-wise).
    async fn top_terms(&self, limit: usize) -> AppResult<Vec<TermFrequency>>;
}
