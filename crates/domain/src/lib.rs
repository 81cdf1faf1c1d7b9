//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod history;
mod rate_window;
mod trending;

pub use history::{HistoryEntry, HistoryRecord};
pub use rate_window::{AdmissionDecision, RateWindow};
pub use trending::{TermFrequency, TrendingSnapshot, compare_frequencies, rank_terms};
