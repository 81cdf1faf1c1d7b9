use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use picsearch_domain::AdmissionDecision;

use crate::clock::Clock;

use super::config::RateLimitRule;
use super::ports::RateWindowStore;

/// Application service for request admission.
#[derive(Clone)]
pub struct RateLimitService {
    store: Arc<dyn RateWindowStore>,
    clock: Arc<dyn Clock>,
    rule: RateLimitRule,
}

impl RateLimitService {
    /// Creates a new rate limit service enforcing `rule`.
    #[must_use]
    pub fn new(store: Arc<dyn RateWindowStore>, clock: Arc<dyn Clock>, rule: RateLimitRule) -> Self {
        Self { store, clock, rule }
    }

    /// Returns the enforced rule.
    #[must_use]
    pub fn rule(&self) -> &RateLimitRule {
        &self.rule
    }

    /// Decides whether a request from `client_key` is admitted.
    ///
    /// Never fails; the caller turns a denial into a "too many requests"
    /// answer.
    pub fn allow(&self, client_key: &str) -> AdmissionDecision {
        let composite_key = format!("{}:{client_key}", self.rule.category);
        self.store
            .admit(&composite_key, &self.rule, self.clock.now())
    }

    /// Time left until the window behind `decision` resets, never negative.
    #[must_use]
    pub fn retry_after(&self, decision: &AdmissionDecision) -> Duration {
        (decision.reset_at - self.clock.now()).max(Duration::zero())
    }

    /// Drops windows of clients idle for longer than `idle_for`.
    ///
    /// `idle_for` is raised to at least one window so an evicted client can
    /// never regain budget earlier than a reset would have given it.
    pub fn evict_idle(&self, idle_for: Duration) -> usize {
        let idle_for = idle_for.max(self.rule.window());
        let cutoff = self
            .clock
            .now()
            .checked_sub_signed(idle_for)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.store.evict_idle(cutoff)
    }

    /// Returns the number of clients currently tracked.
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.store.tracked_clients()
    }
}
