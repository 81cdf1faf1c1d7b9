use serde::{Deserialize, Serialize};

/// User information persisted in the authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    display_name: String,
    email: Option<String>,
    avatar_url: Option<String>,
    provider: String,
}

impl UserIdentity {
    /// Creates a user identity from identity-provider data.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        email: Option<String>,
        avatar_url: Option<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            email,
            avatar_url,
            provider: provider.into(),
        }
    }

    /// Returns the stable subject used as the history key.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the avatar URL, if the provider returned one.
    #[must_use]
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    /// Returns the identity provider name the user signed in with.
    #[must_use]
    pub fn provider(&self) -> &str {
        self.provider.as_str()
    }
}
