use chrono::Duration;
use picsearch_core::{AppError, AppResult};

/// Longest accepted window, one year.
pub const MAX_WINDOW_SECONDS: i64 = 31_536_000;

/// Configuration for a rate limit rule.
#[derive(Debug, Clone)]
pub struct RateLimitRule {
    /// Key namespace for the rule (e.g., "api").
    pub category: String,
    /// Maximum number of admitted requests per window.
    pub max_requests: u32,
    /// Window duration in seconds.
    pub window_seconds: i64,
}

impl RateLimitRule {
    /// Creates a new rate limit rule.
    #[must_use]
    pub fn new(category: impl Into<String>, max_requests: u32, window_seconds: i64) -> Self {
        Self {
            category: category.into(),
            max_requests,
            window_seconds,
        }
    }

    /// Creates a rule after checking that both bounds are positive and the
    /// window is at most [`MAX_WINDOW_SECONDS`].
    pub fn validated(
        category: impl Into<String>,
        max_requests: u32,
        window_seconds: i64,
    ) -> AppResult<Self> {
        if max_requests == 0 {
            return Err(AppError::Validation(
                "rate limit max_requests must be greater than zero".to_owned(),
            ));
        }

        if window_seconds <= 0 {
            return Err(AppError::Validation(
                "rate limit window_seconds must be greater than zero".to_owned(),
            ));
        }

        if window_seconds > MAX_WINDOW_SECONDS {
            return Err(AppError::Validation(format!(
                "rate limit window_seconds must be at most {MAX_WINDOW_SECONDS}, got {window_seconds}"
            )));
        }

        Ok(Self::new(category, max_requests, window_seconds))
    }

    /// Returns the window length, clamped to `1..=MAX_WINDOW_SECONDS`.
    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::seconds(self.window_seconds.clamp(1, MAX_WINDOW_SECONDS))
    }
}
