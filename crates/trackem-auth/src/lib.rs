//! TrackEm Auth — token issuance/verification and the identity
//! resolver chain that turns request credentials into an [`Identity`].
//!
//! [`Identity`]: trackem_core::Identity

pub mod config;
pub mod error;
pub mod provider;
pub mod resolver;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use provider::{IdentityProvider, LegacyBearerProvider, RequestCredentials, SessionTokenProvider};
pub use resolver::IdentityResolver;
pub use token::{LegacyClaims, SessionClaims};
