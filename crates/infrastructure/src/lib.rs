//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_rate_window_store;
mod in_memory_search_history_repository;
mod oauth_identity_provider;
mod postgres_search_history_repository;
mod unsplash_image_search_provider;

pub use in_memory_rate_window_store::InMemoryRateWindowStore;
pub use in_memory_search_history_repository::InMemorySearchHistoryRepository;
pub use oauth_identity_provider::{OAuthClientConfig, OAuthIdentityProvider, OAuthProviderKind};
pub use postgres_search_history_repository::PostgresSearchHistoryRepository;
pub use unsplash_image_search_provider::UnsplashImageSearchProvider;
