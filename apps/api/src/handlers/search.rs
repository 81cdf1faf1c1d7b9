use axum::Json;
use axum::extract::{Extension, Query, State};
use picsearch_core::UserIdentity;
use serde_json::Value;

use crate::dto::{GuestSearchQuery, SearchQuery};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn search_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Value>> {
    let results = state
        .image_search_service
        .search(user.subject(), &query.term, query.page)
        .await?;

    Ok(Json(results))
}

pub async fn guest_search_handler(
    State(state): State<AppState>,
    Query(query): Query<GuestSearchQuery>,
) -> ApiResult<Json<Value>> {
    let results = state
        .image_search_service
        .search_as_guest(query.page)
        .await?;

    Ok(Json(results))
}
