use picsearch_core::AppError;
use sqlx::PgPool;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::redis_session_store::RedisSessionStore;

pub async fn build_postgres_session_layer(
    pool: PgPool,
    cookie_secure: bool,
    ttl_hours: i64,
) -> Result<SessionManagerLayer<PostgresStore>, AppError> {
    let session_store = PostgresStore::new(pool)
        .with_table_name("tower_sessions")
        .map_err(|error| {
            AppError::Validation(format!("invalid session table name configuration: {error}"))
        })?;

    session_store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    Ok(with_cookie_policy(
        SessionManagerLayer::new(session_store),
        cookie_secure,
        ttl_hours,
    ))
}

pub fn build_redis_session_layer(
    redis_client: redis::Client,
    cookie_secure: bool,
    ttl_hours: i64,
) -> SessionManagerLayer<RedisSessionStore> {
    let session_store = RedisSessionStore::new(redis_client, "picsearch:session");
    with_cookie_policy(
        SessionManagerLayer::new(session_store),
        cookie_secure,
        ttl_hours,
    )
}

fn with_cookie_policy<S>(
    layer: SessionManagerLayer<S>,
    cookie_secure: bool,
    ttl_hours: i64,
) -> SessionManagerLayer<S>
where
    S: tower_sessions::SessionStore,
{
    layer
        .with_secure(cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::hours(ttl_hours)))
}
