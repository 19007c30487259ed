use std::env;

use futures::future::BoxFuture;

/// Environment variable holding the catalog/playback bearer token.
pub const ACCESS_TOKEN_ENV: &str = "SPOTIFY_ACCESS_TOKEN";

/// Source of the bearer token used by the catalog and playback adapters.
///
/// Implementations refresh the token on their own; `None` means no credential is
/// available and a session cannot be set up.
pub trait CredentialProvider: Send + Sync {
    /// Current bearer token, if any.
    fn bearer_token(&self) -> BoxFuture<'static, Option<String>>;
}

/// Credential read once from the environment.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    token: Option<String>,
}

impl StaticCredentials {
    /// Wrap a fixed token. Blank tokens count as missing.
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|token| !token.trim().is_empty()),
        }
    }

    /// Read the token from [`ACCESS_TOKEN_ENV`].
    pub fn from_env() -> Self {
        Self::new(env::var(ACCESS_TOKEN_ENV).ok())
    }
}

impl CredentialProvider for StaticCredentials {
    fn bearer_token(&self) -> BoxFuture<'static, Option<String>> {
        let token = self.token.clone();
        Box::pin(async move { token })
    }
}
