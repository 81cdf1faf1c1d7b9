use std::sync::Arc;
use std::time::Duration;

use picsearch_core::{AppError, AppResult};
use picsearch_domain::{TrendingSnapshot, compare_frequencies};

use crate::store_call::bounded;

use super::ports::TermFrequencyRepository;

/// Size bounds for trending requests.
#[derive(Debug, Clone, Copy)]
pub struct TrendingLimits {
    /// Number of terms returned when the caller does not ask for a size.
    pub default_limit: usize,
    /// Largest size a caller may ask for.
    pub max_limit: usize,
}

impl Default for TrendingLimits {
    fn default() -> Self {
        Self {
            default_limit: 5,
            max_limit: 50,
        }
    }
}

/// Application service computing trending terms on demand.
#[derive(Clone)]
pub struct TrendingService {
    repository: Arc<dyn TermFrequencyRepository>,
    limits: TrendingLimits,
    store_timeout: Duration,
}

impl TrendingService {
    /// Creates a new trending service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn TermFrequencyRepository>,
        limits: TrendingLimits,
        store_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            limits,
            store_timeout,
        }
    }

    /// Computes the `limit` most frequent terms across all users.
    ///
    /// An empty corpus or a zero limit yields an empty snapshot.
    pub async fn top(&self, limit: usize) -> AppResult<TrendingSnapshot> {
        if limit > self.limits.max_limit {
            return Err(AppError::Validation(format!(
                "trending limit must be at most {}, got {limit}",
                self.limits.max_limit
            )));
        }

        if limit == 0 {
            return Ok(TrendingSnapshot::default());
        }

        let mut ranked = bounded(
            self.store_timeout,
            "trending aggregation",
            self.repository.top_terms(limit),
        )
        .await?;

        // Adapters sort already; this pins the order to byte-wise comparison.
        ranked.sort_by(compare_frequencies);
        ranked.truncate(limit);

        Ok(TrendingSnapshot::new(ranked))
    }

    /// Computes trending terms with the configured default size.
    pub async fn top_default(&self) -> AppResult<TrendingSnapshot> {
        self.top(self.limits.default_limit).await
    }
}
