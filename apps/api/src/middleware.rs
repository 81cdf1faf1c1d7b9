use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use ipnet::IpNet;
use picsearch_core::{AppError, UserIdentity};
use picsearch_domain::AdmissionDecision;
use tower_sessions::Session;
use tracing::debug;

use crate::auth::SESSION_USER_KEY;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const UNKNOWN_CLIENT: &str = "unknown";

/// Resolves the signed-in user or rejects the request with 401.
pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Counts the request against its client's window; denied requests get 429
/// without reaching the handler.
pub async fn admit_request(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip());
    let client_key = client_key(peer, request.headers(), &state.trusted_proxies);

    let decision = state.rate_limit_service.allow(&client_key);
    let max_requests = state.rate_limit_service.rule().max_requests;

    if !decision.admitted {
        let retry_after = state.rate_limit_service.retry_after(&decision);
        // Round up so clients never retry inside the closed window.
        let retry_after_seconds = (retry_after.num_milliseconds() + 999) / 1000;
        debug!(client = %client_key, retry_after_seconds, "request denied by rate limit");

        let mut response = ApiError(AppError::RateLimited(
            "too many requests, please try again later".to_owned(),
        ))
        .into_response();
        let headers = response.headers_mut();
        headers.insert(
            "retry-after",
            HeaderValue::from(retry_after_seconds.max(1)),
        );
        insert_rate_limit_headers(headers, max_requests, &decision);
        return response;
    }

    let mut response = next.run(request).await;
    insert_rate_limit_headers(response.headers_mut(), max_requests, &decision);
    response
}

fn insert_rate_limit_headers(
    headers: &mut HeaderMap,
    max_requests: u32,
    decision: &AdmissionDecision,
) {
    headers.insert("x-ratelimit-limit", HeaderValue::from(max_requests));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert(
        "x-ratelimit-reset",
        HeaderValue::from(decision.reset_at.timestamp()),
    );
}

/// Key identifying the client for admission.
///
/// The first `X-Forwarded-For` hop is only honored when the direct peer is a
/// trusted proxy; otherwise any client could pick its own key.
pub fn client_key(peer: Option<IpAddr>, headers: &HeaderMap, trusted_proxies: &[IpNet]) -> String {
    let Some(peer) = peer else {
        return UNKNOWN_CLIENT.to_owned();
    };

    if !trusted_proxies.iter().any(|network| network.contains(&peer)) {
        return peer.to_string();
    }

    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .and_then(|value| value.parse::<IpAddr>().ok())
        .unwrap_or(peer)
        .to_string()
}
