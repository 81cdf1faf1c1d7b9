use axum::Json;
use axum::extract::{Extension, State};
use picsearch_core::UserIdentity;

use crate::dto::{GenericMessageResponse, HistoryResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// A user who never searched gets two empty lists.
pub async fn history_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<HistoryResponse>> {
    let record = state
        .search_history_service
        .get_or_empty(user.subject())
        .await?;

    Ok(Json(HistoryResponse::from(record)))
}

pub async fn clear_history_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<GenericMessageResponse>> {
    state.search_history_service.clear(user.subject()).await?;
    Ok(Json(GenericMessageResponse::new("history cleared")))
}
