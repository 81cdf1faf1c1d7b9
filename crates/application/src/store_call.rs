use std::future::Future;
use std::time::Duration;

use picsearch_core::{AppError, AppResult};

/// Runs a store operation with an upper bound on its duration.
///
/// On expiry the inner future is dropped, which abandons the in-flight call.
pub(crate) async fn bounded<T, F>(limit: Duration, operation: &str, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!(
            "{operation} did not complete within {} ms",
            limit.as_millis()
        ))),
    }
}
