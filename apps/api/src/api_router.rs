use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use picsearch_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;


pub fn build_router<S>(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<S>,
) -> Result<Router, AppError>
where
    S: SessionStore + Clone,
{
    let protected_routes = Router::new()
        .route("/api/me", get(auth::me_handler))
        .route("/api/search", get(handlers::search::search_handler))
        .route("/api/history", get(handlers::history::history_handler))
        .route(
            "/api/history/clear",
            post(handlers::history::clear_history_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    // Admission runs before authentication so anonymous floods are cut off too.
    let admitted_routes = Router::new()
        .route("/api/auth/{provider}", get(auth::oauth_start_handler))
        .route(
            "/api/auth/{provider}/callback",
            get(auth::oauth_callback_handler),
        )
        .route("/api/logout", get(auth::logout_handler))
        .route(
            "/api/top-searches",
            get(handlers::trending::top_searches_handler),
        )
        .route("/api/trending", get(handlers::trending::trending_handler))
        .route(
            "/api/search-guest",
            get(handlers::search::guest_search_handler),
        )
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::admit_request,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(admitted_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}
