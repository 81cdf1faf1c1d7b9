use std::sync::Arc;

use chrono::{Duration, DurationRound, Utc};
use picsearch_application::{SearchHistoryRepository, TermFrequencyRepository};
use picsearch_domain::HistoryEntry;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresSearchHistoryRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(8)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for search history tests: {error}");
    }

    Some(pool)
}

fn unique_user(label: &str) -> String {
    format!(
        "{label}-{}",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

#[tokio::test]
async fn missing_user_returns_none() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresSearchHistoryRepository::new(pool);

    let found = repository.find_history(&unique_user("missing")).await;
    assert!(matches!(found, Ok(None)));
}

#[tokio::test]
async fn appends_preserve_terms_and_order() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresSearchHistoryRepository::new(pool);
    let user_id = unique_user("ordered");
    // Postgres keeps microseconds.
    let start = Utc::now()
        .duration_trunc(Duration::microseconds(1))
        .unwrap_or_else(|_| Utc::now());

    for (offset, term) in ["cat", "Dog ", "cat"].into_iter().enumerate() {
        let appended = repository
            .append_entry(
                &user_id,
                HistoryEntry::new(term, start + Duration::seconds(offset as i64)),
            )
            .await;
        assert!(appended.is_ok());
    }

    let record = repository.find_history(&user_id).await.ok().flatten();
    assert!(record.is_some());
    let record = record.unwrap_or_else(|| unreachable!());
    assert_eq!(record.terms(), ["cat", "Dog ", "cat"].map(str::to_owned));
    assert_eq!(record.observed_at()[0], start);
    assert_eq!(record.observed_at()[2], start + Duration::seconds(2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_lose_nothing() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = Arc::new(PostgresSearchHistoryRepository::new(pool));
    let user_id = unique_user("concurrent");

    let tasks: Vec<_> = (0..40)
        .map(|index| {
            let repository = Arc::clone(&repository);
            let user_id = user_id.clone();
            tokio::spawn(async move {
                repository
                    .append_entry(&user_id, HistoryEntry::new(format!("t{index}"), Utc::now()))
                    .await
            })
        })
        .collect();

    for task in tasks {
        assert!(matches!(task.await, Ok(Ok(()))));
    }

    let record = repository.find_history(&user_id).await.ok().flatten();
    assert_eq!(record.map(|record| record.len()).unwrap_or(0), 40);
}

#[tokio::test]
async fn clear_empties_existing_and_ignores_missing() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresSearchHistoryRepository::new(pool);
    let user_id = unique_user("clear");

    assert!(repository.clear_history(&user_id).await.is_ok());
    assert!(matches!(repository.find_history(&user_id).await, Ok(None)));

    let appended = repository
        .append_entry(&user_id, HistoryEntry::new("cat", Utc::now()))
        .await;
    assert!(appended.is_ok());
    assert!(repository.clear_history(&user_id).await.is_ok());

    let record = repository.find_history(&user_id).await.ok().flatten();
    assert_eq!(record.map(|record| record.len()), Some(0));
}

#[tokio::test]
async fn top_terms_orders_by_count_then_bytes() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresSearchHistoryRepository::new(pool);
    let prefix = unique_user("trend");
    let user_id = format!("{prefix}-user");

    // Terms are prefixed so rows from other tests cannot interleave.
    for (term, count) in [("zz-B", 2), ("zz-a", 2), ("zz-c", 1)] {
        for _ in 0..count {
            let appended = repository
                .append_entry(&user_id, HistoryEntry::new(format!("{prefix}{term}"), Utc::now()))
                .await;
            assert!(appended.is_ok());
        }
    }

    let ranked: Vec<String> = repository
        .top_terms(10_000)
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|entry| entry.term.starts_with(&prefix))
        .map(|entry| entry.term.trim_start_matches(&prefix).to_owned())
        .collect();
    assert_eq!(ranked, vec!["zz-B", "zz-a", "zz-c"]);
}
