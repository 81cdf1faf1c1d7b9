use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use picsearch_application::{RateLimitRule, RateWindowStore};
use picsearch_domain::{AdmissionDecision, RateWindow};

/// Process-local table of per-client rate windows.
///
/// Admissions hold the map's shared lock while updating the entry under its
/// own mutex, so clients never contend with each other for the
/// read-modify-write. Inserting a new client and evicting idle ones take the
/// exclusive lock and cannot interleave with an update in flight.
#[derive(Debug, Default)]
pub struct InMemoryRateWindowStore {
    windows: RwLock<HashMap<String, Mutex<RateWindow>>>,
}

impl InMemoryRateWindowStore {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn admit_window(
    window: &Mutex<RateWindow>,
    rule: &RateLimitRule,
    now: DateTime<Utc>,
) -> AdmissionDecision {
    window
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .admit(rule.max_requests, rule.window(), now)
}

impl RateWindowStore for InMemoryRateWindowStore {
    fn admit(&self, key: &str, rule: &RateLimitRule, now: DateTime<Utc>) -> AdmissionDecision {
        {
            let windows = self.windows.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(window) = windows.get(key) {
                return admit_window(window, rule, now);
            }
        }

        let mut windows = self.windows.write().unwrap_or_else(PoisonError::into_inner);
        let window = windows
            .entry(key.to_owned())
            .or_insert_with(|| Mutex::new(RateWindow::start(now)));
        admit_window(window, rule, now)
    }

    fn evict_idle(&self, cutoff: DateTime<Utc>) -> usize {
        let mut windows = self.windows.write().unwrap_or_else(PoisonError::into_inner);
        let before = windows.len();
        windows.retain(|_, window| {
            !window
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner)
                .is_idle_since(cutoff)
        });
        before - windows.len()
    }

    fn tracked_clients(&self) -> usize {
        self.windows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
