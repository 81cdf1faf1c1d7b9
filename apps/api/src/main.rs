//! picsearch API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod rate_window_sweep;
mod redis_session_store;
mod shutdown;
mod state;

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use picsearch_core::AppError;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api_config::{ApiConfig, SessionBackend};
use crate::api_services::{
    build_app_state, build_postgres_session_layer, build_redis_client, build_redis_session_layer,
    connect_and_migrate,
};

const RATE_WINDOW_SWEEP_EVERY: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;
    let pool = connect_and_migrate(&config.database_url, config.store_timeout()).await?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        pool.close().await;
        return Ok(());
    }

    let app_state = build_app_state(pool.clone(), &config)?;
    let rate_limit_service = app_state.rate_limit_service.clone();
    let enabled_providers = app_state
        .identity_service
        .provider_names()
        .join(",");

    let app: Router = match config.session_backend {
        SessionBackend::Postgres => {
            let session_layer = build_postgres_session_layer(
                pool.clone(),
                config.cookie_secure,
                config.session_ttl_hours,
            )
            .await?;
            api_router::build_router(app_state, &config.frontend_url, session_layer)?
        }
        SessionBackend::Redis => {
            let redis_url = config.redis_url.as_deref().ok_or_else(|| {
                AppError::Validation("REDIS_URL is required when SESSION_BACKEND=redis".to_owned())
            })?;
            let session_layer = build_redis_session_layer(
                build_redis_client(redis_url)?,
                config.cookie_secure,
                config.session_ttl_hours,
            );
            api_router::build_router(app_state, &config.frontend_url, session_layer)?
        }
    };

    let shutdown_token = shutdown::create_shutdown_token();
    let sweep = rate_window_sweep::spawn_rate_window_sweep(
        rate_limit_service,
        config.rate_limit_idle_eviction(),
        RATE_WINDOW_SWEEP_EVERY,
        shutdown_token.child_token(),
    );

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(
        %address,
        providers = %enabled_providers,
        max_requests = config.rate_limit_max_requests,
        window_seconds = config.rate_limit_window_seconds,
        "picsearch-api listening"
    );

    let served = serve(listener, app, shutdown_token.clone()).await;

    shutdown_token.cancel();
    if let Err(error) = sweep.await {
        tracing::warn!(%error, "rate window sweep task ended abnormally");
    }
    pool.close().await;
    info!("picsearch-api stopped");

    served
}

async fn serve(
    listener: tokio::net::TcpListener,
    app: Router,
    shutdown_token: CancellationToken,
) -> Result<(), AppError> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
    .await
    .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
