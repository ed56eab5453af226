//! Authentication seam.
//!
//! Token acquisition and refresh (identity provider, token exchange)
//! live outside this crate; the client only needs the current access
//! token and the signed-in user's URN, supplied through this trait.

use async_trait::async_trait;

/// Access token and identity supplied by the authentication collaborator.
#[async_trait]
pub trait Credentials: Send + Sync {
    /// Current Trovi access token, if the user is signed in.
    async fn access_token(&self) -> Option<String>;

    /// URN identifying the signed-in user, if any.
    fn user_urn(&self) -> Option<String>;
}

/// Anonymous browsing: no token, no identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

#[async_trait]
impl Credentials for Anonymous {
    async fn access_token(&self) -> Option<String> {
        None
    }

    fn user_urn(&self) -> Option<String> {
        None
    }
}

/// Fixed token and identity, for tools and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    pub token: Option<String>,
    pub user_urn: Option<String>,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>, user_urn: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            user_urn: Some(user_urn.into()),
        }
    }
}

#[async_trait]
impl Credentials for StaticCredentials {
    async fn access_token(&self) -> Option<String> {
        self.token.clone()
    }

    fn user_urn(&self) -> Option<String> {
        self.user_urn.clone()
    }
}
