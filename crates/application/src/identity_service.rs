//! Sign-in through external identity providers.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use picsearch_core::{AppError, AppResult, UserIdentity};

/// Port for an OAuth2 style identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Stable provider name used in routes (e.g., "github").
    fn name(&self) -> &str;

    /// Builds the URL the browser is sent to. `state` must come back unchanged
    /// on the callback.
    fn authorization_url(&self, state: &str) -> AppResult<String>;

    /// Exchanges an authorization code for the signed-in identity.
    async fn complete_login(&self, code: &str) -> AppResult<UserIdentity>;
}

/// Application service dispatching sign-in to configured providers.
#[derive(Clone, Default)]
pub struct IdentityService {
    providers: BTreeMap<String, Arc<dyn IdentityProvider>>,
}

impl IdentityService {
    /// Creates a service over the given providers.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn IdentityProvider>>) -> Self {
        Self {
            providers: providers
                .into_iter()
                .map(|provider| (provider.name().to_owned(), provider))
                .collect(),
        }
    }

    /// Returns the names of enabled providers.
    #[must_use]
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    /// Starts a sign-in with `provider_name`.
    pub fn begin_login(&self, provider_name: &str, state: &str) -> AppResult<String> {
        self.provider(provider_name)?.authorization_url(state)
    }

    /// Completes a sign-in with `provider_name`.
    pub async fn complete_login(&self, provider_name: &str, code: &str) -> AppResult<UserIdentity> {
        if code.trim().is_empty() {
            return Err(AppError::Unauthorized(
                "authorization code is missing".to_owned(),
            ));
        }

        self.provider(provider_name)?.complete_login(code).await
    }

    fn provider(&self, provider_name: &str) -> AppResult<&Arc<dyn IdentityProvider>> {
        self.providers.get(provider_name).ok_or_else(|| {
            AppError::NotFound(format!("identity provider '{provider_name}' is not enabled"))
        })
    }
}
