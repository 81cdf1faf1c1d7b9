use axum::Json;
use axum::extract::{Query, State};
use picsearch_domain::TrendingSnapshot;

use crate::dto::{TopSearchesQuery, TrendingTermResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Most searched terms across all users, most frequent first.
pub async fn top_searches_handler(
    State(state): State<AppState>,
    Query(query): Query<TopSearchesQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let snapshot = snapshot_for(&state, query).await?;
    Ok(Json(snapshot.terms()))
}

/// Same ranking as [`top_searches_handler`], with occurrence counts.
pub async fn trending_handler(
    State(state): State<AppState>,
    Query(query): Query<TopSearchesQuery>,
) -> ApiResult<Json<Vec<TrendingTermResponse>>> {
    let snapshot = snapshot_for(&state, query).await?;
    Ok(Json(
        snapshot
            .top_terms()
            .iter()
            .map(TrendingTermResponse::from)
            .collect(),
    ))
}

async fn snapshot_for(state: &AppState, query: TopSearchesQuery) -> ApiResult<TrendingSnapshot> {
    let snapshot = match query.limit {
        Some(limit) => state.trending_service.top(limit).await?,
        None => state.trending_service.top_default().await?,
    };
    Ok(snapshot)
}
