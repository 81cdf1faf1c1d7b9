//! OAuth2 authorization-code sign-in for Google, GitHub and Facebook.

use async_trait::async_trait;
use picsearch_application::IdentityProvider;
use picsearch_core::{AppError, AppResult, UserIdentity};
use reqwest::header;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use url::Url;
use url::form_urlencoded;

const USER_AGENT: &str = "picsearch-api";

/// Supported OAuth2 providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProviderKind {
    /// Google accounts.
    Google,
    /// GitHub accounts.
    GitHub,
    /// Facebook accounts.
    Facebook,
}

impl OAuthProviderKind {
    /// Returns the route name for this provider.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::GitHub => "github",
            Self::Facebook => "facebook",
        }
    }

    /// Parses a route name.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "google" => Ok(Self::Google),
            "github" => Ok(Self::GitHub),
            "facebook" => Ok(Self::Facebook),
            _ => Err(AppError::Validation(format!(
                "unknown identity provider '{value}'"
            ))),
        }
    }

    fn authorize_endpoint(self) -> &'static str {
        match self {
            Self::Google => "https://accounts.google.com/o/oauth2/v2/auth",
            Self::GitHub => "https://github.com/login/oauth/authorize",
            Self::Facebook => "https://www.facebook.com/v19.0/dialog/oauth",
        }
    }

    fn token_endpoint(self) -> &'static str {
        match self {
            Self::Google => "https://oauth2.googleapis.com/token",
            Self::GitHub => "https://github.com/login/oauth/access_token",
            Self::Facebook => "https://graph.facebook.com/v19.0/oauth/access_token",
        }
    }

    fn userinfo_endpoint(self) -> &'static str {
        match self {
            Self::Google => "https://openidconnect.googleapis.com/v1/userinfo",
            Self::GitHub => "https://api.github.com/user",
            Self::Facebook => "https://graph.facebook.com/me?fields=id,name,email,picture",
        }
    }

    fn scopes(self) -> &'static str {
        match self {
            Self::Google => "openid email profile",
            Self::GitHub => "read:user user:email",
            Self::Facebook => "email public_profile",
        }
    }
}

/// Client credentials for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthClientConfig {
    /// Application client id.
    pub client_id: String,
    /// Application client secret.
    pub client_secret: String,
    /// Callback URL registered with the provider.
    pub redirect_uri: String,
}

/// Identity provider speaking the OAuth2 authorization-code flow.
#[derive(Clone)]
pub struct OAuthIdentityProvider {
    http_client: reqwest::Client,
    kind: OAuthProviderKind,
    config: OAuthClientConfig,
}

impl OAuthIdentityProvider {
    /// Creates a provider adapter.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        kind: OAuthProviderKind,
        config: OAuthClientConfig,
    ) -> Self {
        Self {
            http_client,
            kind,
            config,
        }
    }

    async fn exchange_code(&self, code: &str) -> AppResult<String> {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "authorization_code")
            .append_pair("code", code)
            .append_pair("client_id", &self.config.client_id)
            .append_pair("client_secret", &self.config.client_secret)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .finish();

        let response = self
            .http_client
            .post(self.kind.token_endpoint())
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|error| {
                AppError::Upstream(format!(
                    "{} token exchange failed: {error}",
                    self.kind.as_str()
                ))
            })?;

        let status = response.status();
        if status.is_client_error() {
            warn!(provider = self.kind.as_str(), %status, "authorization code was rejected");
            return Err(AppError::Unauthorized(format!(
                "{} rejected the authorization code with status {status}",
                self.kind.as_str()
            )));
        }
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "{} token endpoint answered with status {status}",
                self.kind.as_str()
            )));
        }

        let token = response.json::<TokenResponse>().await.map_err(|error| {
            AppError::Upstream(format!(
                "failed to parse {} token response: {error}",
                self.kind.as_str()
            ))
        })?;

        // GitHub reports bad codes with 200 and an `error` field.
        match token.access_token {
            Some(access_token) if !access_token.is_empty() => Ok(access_token),
            _ => Err(AppError::Unauthorized(format!(
                "{} did not issue an access token: {}",
                self.kind.as_str(),
                token.error.unwrap_or_else(|| "unknown error".to_owned())
            ))),
        }
    }

    async fn fetch_profile(&self, access_token: &str) -> AppResult<Value> {
        let response = self
            .http_client
            .get(self.kind.userinfo_endpoint())
            .bearer_auth(access_token)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|error| {
                AppError::Upstream(format!(
                    "{} profile request failed: {error}",
                    self.kind.as_str()
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "{} profile endpoint answered with status {status}",
                self.kind.as_str()
            )));
        }

        response.json::<Value>().await.map_err(|error| {
            AppError::Upstream(format!(
                "failed to parse {} profile: {error}",
                self.kind.as_str()
            ))
        })
    }
}

#[async_trait]
impl IdentityProvider for OAuthIdentityProvider {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn authorization_url(&self, state: &str) -> AppResult<String> {
        let mut url = Url::parse(self.kind.authorize_endpoint()).map_err(|error| {
            AppError::Internal(format!(
                "invalid {} authorize endpoint: {error}",
                self.kind.as_str()
            ))
        })?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", self.kind.scopes())
            .append_pair("state", state);

        Ok(url.into())
    }

    async fn complete_login(&self, code: &str) -> AppResult<UserIdentity> {
        let access_token = self.exchange_code(code).await?;
        let profile = self.fetch_profile(&access_token).await?;
        identity_from_profile(self.kind, &profile)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

fn identity_from_profile(kind: OAuthProviderKind, profile: &Value) -> AppResult<UserIdentity> {
    let id_field = match kind {
        OAuthProviderKind::Google => "sub",
        OAuthProviderKind::GitHub | OAuthProviderKind::Facebook => "id",
    };

    // GitHub ids are numbers, the others are strings.
    let provider_user_id = match profile.get(id_field) {
        Some(Value::String(value)) if !value.is_empty() => value.clone(),
        Some(Value::Number(value)) => value.to_string(),
        _ => {
            return Err(AppError::Upstream(format!(
                "{} profile is missing '{id_field}'",
                kind.as_str()
            )));
        }
    };

    let string_field = |name: &str| {
        profile
            .get(name)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    };

    let display_name = match kind {
        OAuthProviderKind::GitHub => string_field("name").or_else(|| string_field("login")),
        OAuthProviderKind::Google | OAuthProviderKind::Facebook => string_field("name"),
    }
    .unwrap_or_else(|| provider_user_id.clone());

    let avatar_url = match kind {
        OAuthProviderKind::Google => string_field("picture"),
        OAuthProviderKind::GitHub => string_field("avatar_url"),
        OAuthProviderKind::Facebook => profile
            .pointer("/picture/data/url")
            .and_then(Value::as_str)
            .map(str::to_owned),
    };

    Ok(UserIdentity::new(
        format!("{}:{provider_user_id}", kind.as_str()),
        display_name,
        string_field("email"),
        avatar_url,
        kind.as_str(),
    ))
}
