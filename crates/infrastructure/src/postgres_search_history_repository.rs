//! PostgreSQL-backed search history using the `search_history` table.
//!
//! Each user owns one row with two index-aligned arrays. Appends are a single
//! upsert evaluated by the server, so concurrent appends for the same user
//! serialize on the row lock instead of racing through a read in the caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use picsearch_application::{SearchHistoryRepository, TermFrequencyRepository};
use picsearch_core::{AppError, AppResult};
use picsearch_domain::{HistoryEntry, HistoryRecord, TermFrequency};

#[cfg(test)]
mod tests;

const CHECK_VIOLATION: &str = "23514";

/// PostgreSQL implementation of the history ports.
#[derive(Clone)]
pub struct PostgresSearchHistoryRepository {
    pool: PgPool,
}

impl PostgresSearchHistoryRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchHistoryRepository for PostgresSearchHistoryRepository {
    async fn find_history(&self, user_id: &str) -> AppResult<Option<HistoryRecord>> {
        let row = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT user_id, terms, observed_at
            FROM search_history
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| store_error("failed to load search history", error))?;

        row.map(|row| HistoryRecord::from_columns(row.user_id, row.terms, row.observed_at))
            .transpose()
    }

    async fn append_entry(&self, user_id: &str, entry: HistoryEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO search_history (user_id, terms, observed_at)
            VALUES ($1, ARRAY[$2::text], ARRAY[$3::timestamptz])
            ON CONFLICT (user_id) DO UPDATE
            SET
                terms = array_append(search_history.terms, $2::text),
                observed_at = array_append(search_history.observed_at, $3::timestamptz),
                updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(entry.term())
        .bind(entry.observed_at())
        .execute(&self.pool)
        .await
        .map_err(|error| store_error("failed to append search history", error))?;

        Ok(())
    }

    async fn clear_history(&self, user_id: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE search_history
            SET terms = '{}', observed_at = '{}', updated_at = now()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|error| store_error("failed to clear search history", error))?;

        Ok(())
    }
}

#[async_trait]
impl TermFrequencyRepository for PostgresSearchHistoryRepository {
    async fn top_terms(&self, limit: usize) -> AppResult<Vec<TermFrequency>> {
        let limit = i64::try_from(limit)
            .map_err(|error| AppError::Validation(format!("invalid trending limit: {error}")))?;

        let rows = sqlx::query_as::<_, TermFrequencyRow>(
            r#"
            SELECT term, COUNT(*) AS occurrences
            FROM search_history, unnest(search_history.terms) AS term
            GROUP BY term
            ORDER BY occurrences DESC, term COLLATE "C" ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| store_error("failed to aggregate trending terms", error))?;

        rows.into_iter()
            .map(|row| {
                let count = u64::try_from(row.occurrences).map_err(|error| {
                    AppError::Corruption(format!(
                        "negative occurrence count for term '{}': {error}",
                        row.term
                    ))
                })?;
                Ok(TermFrequency::new(row.term, count))
            })
            .collect()
    }
}

/// Maps driver failures onto the store error taxonomy.
pub(crate) fn store_error(context: &str, error: sqlx::Error) -> AppError {
    match &error {
        sqlx::Error::PoolTimedOut => AppError::Timeout(format!("{context}: {error}")),
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolClosed => {
            AppError::Unavailable(format!("{context}: {error}"))
        }
        sqlx::Error::Database(database_error)
            if database_error.code().as_deref() == Some(CHECK_VIOLATION) =>
        {
            AppError::Corruption(format!("{context}: {error}"))
        }
        _ => AppError::Internal(format!("{context}: {error}")),
    }
}

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    user_id: String,
    terms: Vec<String>,
    observed_at: Vec<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct TermFrequencyRow {
    term: String,
    occurrences: i64,
}
