//! Shared primitives for all Rust crates in picsearch.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::UserIdentity;

/// Result type used across picsearch crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated string that is not empty or whitespace-only.
///
/// The original value is kept verbatim; validation only looks at the trimmed
/// form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Request was rejected by the admission controller.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Backing store did not answer within the configured bound.
    #[error("store timeout: {0}")]
    Timeout(String),

    /// Persisted data violates a structural invariant.
    #[error("data corruption: {0}")]
    Corruption(String),

    /// An external provider failed or answered with an unusable payload.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns true for outcomes that are part of normal operation and should
    /// not be logged as failures.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::RateLimited(_) | Self::Validation(_) | Self::Unauthorized(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn non_empty_string_keeps_surrounding_whitespace() {
        let value = NonEmptyString::new("Dog ").unwrap_or_else(|_| unreachable!());
        assert_eq!(value.as_str(), "Dog ");
    }

    #[test]
    fn expected_errors_exclude_store_failures() {
        assert!(AppError::RateLimited("slow down".to_owned()).is_expected());
        assert!(AppError::NotFound("history".to_owned()).is_expected());
        assert!(!AppError::Timeout("history".to_owned()).is_expected());
        assert!(!AppError::Corruption("history".to_owned()).is_expected());
    }
}
