//! Ordered chain of [`IdentityProvider`]s.

use tracing::debug;
use trackem_core::error::{TrackemError, TrackemResult};
use trackem_core::Identity;

use crate::config::AuthConfig;
use crate::provider::{
    IdentityProvider, LegacyBearerProvider, RequestCredentials, SessionTokenProvider,
};

/// Resolves request credentials to the canonical [`Identity`].
///
/// Providers are tried in order and the first one that yields an
/// identity wins. When none does the caller is unauthenticated.
pub struct IdentityResolver {
    providers: Vec<Box<dyn IdentityProvider>>,
}

impl IdentityResolver {
    pub fn new(providers: Vec<Box<dyn IdentityProvider>>) -> Self {
        Self { providers }
    }

    /// Session tokens first, then legacy bearer tokens when a legacy
    /// secret is configured.
    pub fn from_config(config: &AuthConfig) -> Self {
        let mut providers: Vec<Box<dyn IdentityProvider>> =
            vec![Box::new(SessionTokenProvider::new(config.clone()))];
        if config.legacy_jwt_secret.is_some() {
            providers.push(Box::new(LegacyBearerProvider::new(config.clone())));
        }
        Self::new(providers)
    }

    pub fn resolve(&self, credentials: &RequestCredentials) -> TrackemResult<Identity> {
        for provider in &self.providers {
            if let Some(identity) = provider.identify(credentials) {
                debug!(
                    provider = provider.name(),
                    user_id = %identity.user_id,
                    "identity resolved"
                );
                return Ok(identity);
            }
        }
        Err(TrackemError::Unauthenticated)
    }
}
