use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use picsearch_core::{AppError, UserIdentity};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::AppState;

use super::{SESSION_OAUTH_STATE_KEY, SESSION_USER_KEY};

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub async fn oauth_start_handler(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    session: Session,
) -> ApiResult<Redirect> {
    let login_state = Uuid::new_v4().to_string();
    let authorization_url = state
        .identity_service
        .begin_login(&provider, &login_state)?;

    session
        .insert(SESSION_OAUTH_STATE_KEY, (&provider, &login_state))
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist oauth state: {error}")))?;

    Ok(Redirect::to(&authorization_url))
}

pub async fn oauth_callback_handler(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthCallbackQuery>,
    session: Session,
) -> ApiResult<Redirect> {
    let pending = session
        .remove::<(String, String)>(SESSION_OAUTH_STATE_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read oauth state: {error}")))?;

    if let Some(error) = query.error {
        warn!(%provider, %error, "identity provider reported a failed sign-in");
        return Err(AppError::Unauthorized(format!("sign-in was not completed: {error}")).into());
    }

    verify_login_state(pending, &provider, query.state.as_deref())?;

    let identity = state
        .identity_service
        .complete_login(&provider, query.code.as_deref().unwrap_or_default())
        .await?;

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    info!(subject = identity.subject(), %provider, "user signed in");

    Ok(Redirect::to(
        frontend_redirect(&state.frontend_url, &identity)?.as_str(),
    ))
}

fn verify_login_state(
    pending: Option<(String, String)>,
    provider: &str,
    returned_state: Option<&str>,
) -> Result<(), AppError> {
    match (pending, returned_state) {
        (Some((pending_provider, pending_state)), Some(returned_state))
            if pending_provider == provider && pending_state == returned_state =>
        {
            Ok(())
        }
        _ => Err(AppError::Unauthorized(
            "sign-in state does not match this session".to_owned(),
        )),
    }
}

/// Frontend landing URL carrying the profile fields the web client shows.
fn frontend_redirect(frontend_url: &str, identity: &UserIdentity) -> Result<Url, AppError> {
    let mut url = Url::parse(frontend_url)
        .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?;
    url.query_pairs_mut()
        .append_pair("email", identity.email().unwrap_or_default())
        .append_pair("name", identity.display_name())
        .append_pair("profilePic", identity.avatar_url().unwrap_or_default());
    Ok(url)
}
