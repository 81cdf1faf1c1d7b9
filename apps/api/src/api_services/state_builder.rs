use std::sync::Arc;

use picsearch_application::{
    Clock, IdentityProvider, IdentityService, ImageSearchService, RateLimitService,
    SearchHistoryService, SystemClock, TrendingService,
};
use picsearch_core::AppError;
use picsearch_infrastructure::{
    InMemoryRateWindowStore, OAuthClientConfig, OAuthIdentityProvider,
    PostgresSearchHistoryRepository, UnsplashImageSearchProvider,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let http_client = reqwest::Client::builder()
        .timeout(config.store_timeout())
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build http client: {error}")))?;

    let history_repository = Arc::new(PostgresSearchHistoryRepository::new(pool.clone()));
    let search_history_service = SearchHistoryService::new(
        history_repository.clone(),
        clock.clone(),
        config.store_timeout(),
    );
    let trending_service = TrendingService::new(
        history_repository,
        config.trending_limits(),
        config.store_timeout(),
    );

    let image_provider = Arc::new(UnsplashImageSearchProvider::new(
        http_client.clone(),
        &config.unsplash_api_base_url,
        config.unsplash_access_key.clone(),
    )?);
    let image_search_service =
        ImageSearchService::new(image_provider, search_history_service.clone());

    let identity_providers = config
        .oauth_providers
        .iter()
        .map(|settings| {
            Arc::new(OAuthIdentityProvider::new(
                http_client.clone(),
                settings.kind,
                OAuthClientConfig {
                    client_id: settings.client_id.clone(),
                    client_secret: settings.client_secret.clone(),
                    redirect_uri: config.oauth_redirect_uri(settings.kind),
                },
            )) as Arc<dyn IdentityProvider>
        })
        .collect();

    let rate_limit_service = RateLimitService::new(
        Arc::new(InMemoryRateWindowStore::new()),
        clock,
        config.rate_limit_rule()?,
    );

    Ok(AppState {
        identity_service: IdentityService::new(identity_providers),
        image_search_service,
        search_history_service,
        trending_service,
        rate_limit_service,
        trusted_proxies: config.trusted_proxy_cidrs.clone(),
        frontend_url: config.frontend_url.clone(),
        postgres_pool: pool,
    })
}
