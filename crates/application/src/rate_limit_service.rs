//! Admission control ports and application service.
//!
//! Implements a fixed-window limiter over an in-process table of per-client
//! windows. Fixed windows keep memory and update cost constant per client and
//! may admit up to twice the configured maximum across a window boundary.

mod config;
mod ports;
mod service;


pub use config::{MAX_WINDOW_SECONDS, RateLimitRule};
pub use ports::RateWindowStore;
pub use service::RateLimitService;
