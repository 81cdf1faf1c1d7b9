//! Application services and ports.

#![forbid(unsafe_code)]

mod clock;
mod identity_service;
mod image_search_service;
mod rate_limit_service;
mod search_history_service;
mod store_call;
mod trending_service;

pub use clock::{Clock, SystemClock};
pub use identity_service::{IdentityProvider, IdentityService};
pub use image_search_service::{
    GUEST_SEARCH_TERM, ImageSearchProvider, ImageSearchService, normalize_query,
};
pub use rate_limit_service::{
    MAX_WINDOW_SECONDS, RateLimitRule, RateLimitService, RateWindowStore,
};
pub use search_history_service::{SearchHistoryRepository, SearchHistoryService};
pub use trending_service::{TermFrequencyRepository, TrendingLimits, TrendingService};
