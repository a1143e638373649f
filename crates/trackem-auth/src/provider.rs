//! Credential schemes. Each provider recognises one kind of credential
//! and turns it into an [`Identity`], or declines.

use tracing::debug;
use trackem_core::Identity;

use crate::config::AuthConfig;
use crate::token;

/// The credential-bearing parts of an incoming request.
#[derive(Debug, Clone, Default)]
pub struct RequestCredentials {
    /// Raw `Authorization` header value.
    pub authorization: Option<String>,
    /// Session token taken from the session cookie.
    pub session_token: Option<String>,
}

impl RequestCredentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            authorization: Some(format!("Bearer {}", token.into())),
            session_token: None,
        }
    }

    pub fn session(token: impl Into<String>) -> Self {
        Self {
            authorization: None,
            session_token: Some(token.into()),
        }
    }

    fn bearer_token(&self) -> Option<&str> {
        self.authorization
            .as_deref()
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

pub trait IdentityProvider: Send + Sync {
    /// Short scheme name used in logs.
    fn name(&self) -> &'static str;

    /// `None` when the credential is absent or does not verify.
    fn identify(&self, credentials: &RequestCredentials) -> Option<Identity>;
}

/// EdDSA session tokens.
pub struct SessionTokenProvider {
    config: AuthConfig,
}

impl SessionTokenProvider {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }
}

impl IdentityProvider for SessionTokenProvider {
    fn name(&self) -> &'static str {
        "session"
    }

    fn identify(&self, credentials: &RequestCredentials) -> Option<Identity> {
        let raw = credentials.session_token.as_deref()?;
        match token::decode_session_token(raw, &self.config).and_then(|c| c.identity()) {
            Ok(identity) => Some(identity),
            Err(e) => {
                debug!(provider = self.name(), error = %e, "session token rejected");
                None
            }
        }
    }
}

/// HS256 tokens in an `Authorization: Bearer` header.
pub struct LegacyBearerProvider {
    config: AuthConfig,
}

impl LegacyBearerProvider {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }
}

impl IdentityProvider for LegacyBearerProvider {
    fn name(&self) -> &'static str {
        "legacy-bearer"
    }

    fn identify(&self, credentials: &RequestCredentials) -> Option<Identity> {
        let raw = credentials.bearer_token()?;
        match token::decode_legacy_token(raw, &self.config).and_then(|c| c.identity()) {
            Ok(identity) => Some(identity),
            Err(e) => {
                debug!(provider = self.name(), error = %e, "bearer token rejected");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_required() {
        let creds = RequestCredentials {
            authorization: Some("Basic abc".into()),
            session_token: None,
        };
        assert_eq!(creds.bearer_token(), None);
        assert_eq!(RequestCredentials::bearer("abc").bearer_token(), Some("abc"));
        assert_eq!(RequestCredentials::bearer("  ").bearer_token(), None);
    }
}
