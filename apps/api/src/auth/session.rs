use axum::Json;
use axum::extract::Extension;
use picsearch_core::{AppError, UserIdentity};
use tower_sessions::Session;
use tracing::info;

use crate::dto::{GenericMessageResponse, UserIdentityResponse};
use crate::error::ApiResult;

use super::SESSION_USER_KEY;

pub async fn logout_handler(session: Session) -> ApiResult<Json<GenericMessageResponse>> {
    let subject = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .map(|identity| identity.subject().to_owned());

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    if let Some(subject) = subject {
        info!(%subject, "user signed out");
    }

    Ok(Json(GenericMessageResponse::new("logged out")))
}

pub async fn me_handler(
    Extension(identity): Extension<UserIdentity>,
) -> Json<UserIdentityResponse> {
    Json(UserIdentityResponse::from(identity))
}
