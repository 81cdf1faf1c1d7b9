use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use picsearch_core::{AppError, AppResult};
use picsearch_domain::{TermFrequency, rank_terms};

use super::{TermFrequencyRepository, TrendingLimits, TrendingService};

struct CorpusRepository {
    terms: Vec<&'static str>,
    calls: AtomicUsize,
}

impl CorpusRepository {
    fn new(counts: &[(&'static str, usize)]) -> Self {
        Self {
            terms: counts
                .iter()
                .flat_map(|(term, count)| std::iter::repeat_n(*term, *count))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TermFrequencyRepository for CorpusRepository {
    async fn top_terms(&self, limit: usize) -> AppResult<Vec<TermFrequency>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(rank_terms(self.terms.iter().copied(), limit))
    }
}

struct UnreachableRepository;

#[async_trait]
impl TermFrequencyRepository for UnreachableRepository {
    async fn top_terms(&self, _limit: usize) -> AppResult<Vec<TermFrequency>> {
        Err(AppError::Unavailable("connection refused".to_owned()))
    }
}

fn service_with(repository: Arc<dyn TermFrequencyRepository>) -> TrendingService {
    TrendingService::new(
        repository,
        TrendingLimits::default(),
        Duration::from_secs(1),
    )
}

#[tokio::test]
async fn top_default_returns_five_with_lexicographic_ties() {
    let repository = Arc::new(CorpusRepository::new(&[
        ("cat", 5),
        ("dog", 5),
        ("bird", 3),
        ("fish", 1),
        ("ant", 1),
        ("bee", 1),
    ]));
    let service = service_with(repository);

    let snapshot = service.top_default().await;
    assert!(snapshot.is_ok());
    assert_eq!(
        snapshot.unwrap_or_default().terms(),
        vec!["cat", "dog", "bird", "ant", "bee"]
    );
}

#[tokio::test]
async fn empty_corpus_is_not_an_error() {
    let service = service_with(Arc::new(CorpusRepository::new(&[])));

    let snapshot = service.top(5).await;
    assert!(snapshot.map(|value| value.top_terms().is_empty()).unwrap_or(false));
}

#[tokio::test]
async fn zero_limit_skips_the_store() {
    let repository = Arc::new(CorpusRepository::new(&[("cat", 1)]));
    let service = service_with(repository.clone());

    let snapshot = service.top(0).await;
    assert!(snapshot.map(|value| value.top_terms().is_empty()).unwrap_or(false));
    assert_eq!(repository.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oversized_limit_is_rejected() {
    let service = service_with(Arc::new(CorpusRepository::new(&[("cat", 1)])));

    let result = service.top(51).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn store_failure_is_propagated() {
    let service = service_with(Arc::new(UnreachableRepository));

    let result = service.top(5).await;
    assert!(matches!(result, Err(AppError::Unavailable(_))));
}
