use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use picsearch_core::{AppError, AppResult, NonEmptyString};
use picsearch_domain::{HistoryEntry, HistoryRecord};

use crate::clock::Clock;

use super::{SearchHistoryRepository, SearchHistoryService};

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Default)]
struct TestHistoryRepository {
    records: Mutex<HashMap<String, HistoryRecord>>,
}

#[async_trait]
impl SearchHistoryRepository for TestHistoryRepository {
    async fn find_history(&self, user_id: &str) -> AppResult<Option<HistoryRecord>> {
        let records = self.records.lock().map_err(|error| {
            AppError::Internal(format!("failed to lock repo state: {error}"))
        })?;
        Ok(records.get(user_id).cloned())
    }

    async fn append_entry(&self, user_id: &str, entry: HistoryEntry) -> AppResult<()> {
        let mut records = self.records.lock().map_err(|error| {
            AppError::Internal(format!("failed to lock repo state: {error}"))
        })?;
        records
            .entry(user_id.to_owned())
            .or_insert_with(|| HistoryRecord::empty(user_id))
            .append(entry);
        Ok(())
    }

    async fn clear_history(&self, user_id: &str) -> AppResult<()> {
        let mut records = self.records.lock().map_err(|error| {
            AppError::Internal(format!("failed to lock repo state: {error}"))
        })?;
        if let Some(record) = records.get_mut(user_id) {
            record.clear();
        }
        Ok(())
    }
}

struct StalledHistoryRepository;

#[async_trait]
impl SearchHistoryRepository for StalledHistoryRepository {
    async fn find_history(&self, _user_id: &str) -> AppResult<Option<HistoryRecord>> {
        std::future::pending().await
    }

    async fn append_entry(&self, _user_id: &str, _entry: HistoryEntry) -> AppResult<()> {
        std::future::pending().await
    }

    async fn clear_history(&self, _user_id: &str) -> AppResult<()> {
        std::future::pending().await
    }
}

struct CorruptHistoryRepository;

#[async_trait]
impl SearchHistoryRepository for CorruptHistoryRepository {
    async fn find_history(&self, user_id: &str) -> AppResult<Option<HistoryRecord>> {
        HistoryRecord::from_columns(user_id, vec!["cat".to_owned()], Vec::new()).map(Some)
    }

    async fn append_entry(&self, _user_id: &str, _entry: HistoryEntry) -> AppResult<()> {
        Ok(())
    }

    async fn clear_history(&self, _user_id: &str) -> AppResult<()> {
        Ok(())
    }
}

fn fixed_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
        .single()
        .unwrap_or_else(|| unreachable!())
}

fn service_with(repository: Arc<dyn SearchHistoryRepository>) -> SearchHistoryService {
    SearchHistoryService::new(
        repository,
        Arc::new(FixedClock(fixed_instant())),
        Duration::from_millis(250),
    )
}

#[tokio::test]
async fn get_reports_not_found_for_unknown_user() {
    let service = service_with(Arc::new(TestHistoryRepository::default()));

    let result = service.get("never-searched").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let empty = service.get_or_empty("never-searched").await;
    assert!(empty.map(|record| record.is_empty()).unwrap_or(false));
}

#[tokio::test]
async fn record_search_stamps_entries_with_clock_time() {
    let service = service_with(Arc::new(TestHistoryRepository::default()));
    let term = NonEmptyString::new("Dog ").unwrap_or_else(|_| unreachable!());

    let entry = service.record_search("u1", &term).await;
    assert!(entry.is_ok());

    let record = service
        .get("u1")
        .await
        .unwrap_or_else(|_| HistoryRecord::empty("u1"));
    assert_eq!(record.terms(), ["Dog ".to_owned()]);
    assert_eq!(record.observed_at(), [fixed_instant()]);
}

#[tokio::test]
async fn clear_succeeds_without_record() {
    let service = service_with(Arc::new(TestHistoryRepository::default()));
    assert!(service.clear("nobody").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn stalled_store_surfaces_timeout() {
    let service = service_with(Arc::new(StalledHistoryRepository));

    let read = service.get("u1").await;
    assert!(matches!(read, Err(AppError::Timeout(_))));

    let append = service.append("u1", "cat", fixed_instant()).await;
    assert!(matches!(append, Err(AppError::Timeout(_))));

    let clear = service.clear("u1").await;
    assert!(matches!(clear, Err(AppError::Timeout(_))));
}

#[tokio::test]
async fn corrupt_record_is_not_treated_as_empty() {
    let service = service_with(Arc::new(CorruptHistoryRepository));

    let result = service.get_or_empty("u1").await;
    assert!(matches!(result, Err(AppError::Corruption(_))));
}
