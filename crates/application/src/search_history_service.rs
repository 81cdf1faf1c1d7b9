//! Per-user search history ports and application service.

mod ports;
mod service;

#[cfg(test)]
mod tests;

pub use ports::SearchHistoryRepository;
pub use service::SearchHistoryService;
