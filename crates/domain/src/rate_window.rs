//! Fixed-window admission counting for a single client.

use chrono::{DateTime, Duration, Utc};

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionDecision {
    /// Whether the request may proceed.
    pub admitted: bool,
    /// Admissions still available in the current window.
    pub remaining: u32,
    /// When the current window ends.
    pub reset_at: DateTime<Utc>,
}

/// Request counter for one client over the current window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateWindow {
    count: u32,
    window_start: DateTime<Utc>,
    last_seen_at: DateTime<Utc>,
}

impl RateWindow {
    /// Opens an empty window starting at `now`.
    #[must_use]
    pub fn start(now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            window_start: now,
            last_seen_at: now,
        }
    }

    /// Returns the number of admitted requests in the current window.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Returns when the current window began.
    #[must_use]
    pub fn window_start(&self) -> DateTime<Utc> {
        self.window_start
    }

    /// Counts one request against the window.
    ///
    /// The window is reset first when `now - window_start >= window`. Rejected
    /// requests do not increment the counter, so `count` never exceeds
    /// `max_requests`.
    pub fn admit(
        &mut self,
        max_requests: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> AdmissionDecision {
        self.last_seen_at = now;

        if now - self.window_start >= window {
            self.count = 0;
            self.window_start = now;
        }

        let admitted = self.count < max_requests;
        if admitted {
            self.count += 1;
        }

        AdmissionDecision {
            admitted,
            remaining: max_requests.saturating_sub(self.count),
            reset_at: self
                .window_start
                .checked_add_signed(window)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Returns true when the client has not been seen since `cutoff`.
    #[must_use]
    pub fn is_idle_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_seen_at < cutoff
    }
}
