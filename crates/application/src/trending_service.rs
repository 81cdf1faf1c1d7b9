//! Trending term aggregation over all users' history.

mod ports;
mod service;

#[cfg(test)]
mod tests;

pub use ports::TermFrequencyRepository;
pub use service::{TrendingLimits, TrendingService};
