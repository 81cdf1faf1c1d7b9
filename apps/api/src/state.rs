use ipnet::IpNet;
use picsearch_application::{
    IdentityService, ImageSearchService, RateLimitService, SearchHistoryService, TrendingService,
};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub identity_service: IdentityService,
    pub image_search_service: ImageSearchService,
    pub search_history_service: SearchHistoryService,
    pub trending_service: TrendingService,
    pub rate_limit_service: RateLimitService,
    pub trusted_proxies: Vec<IpNet>,
    pub frontend_url: String,
    pub postgres_pool: PgPool,
}
