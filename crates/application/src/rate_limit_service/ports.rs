use chrono::{DateTime, Utc};
use picsearch_domain::AdmissionDecision;

use super::config::RateLimitRule;

/// Port for the per-client window table.
///
/// Implementations must make each `admit` call atomic with respect to other
/// calls for the same key. Calls for different keys must not serialize on a
/// shared lock for the duration of the update.
pub trait RateWindowStore: Send + Sync {
    /// Counts one request for `key` at `now`, creating the window lazily.
    fn admit(&self, key: &str, rule: &RateLimitRule, now: DateTime<Utc>) -> AdmissionDecision;

    /// Removes windows not touched since `cutoff`. Returns how many were removed.
    fn evict_idle(&self, cutoff: DateTime<Utc>) -> usize;

    /// Returns the number of tracked clients.
    fn tracked_clients(&self) -> usize;
}
