//! Authentication error types.

use thiserror::Error;
use trackem_core::error::TrackemError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("credential scheme is not configured")]
    SchemeDisabled,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for TrackemError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired | AuthError::TokenInvalid(_) | AuthError::SchemeDisabled => {
                TrackemError::Unauthenticated
            }
            AuthError::Crypto(msg) => TrackemError::Internal(msg),
        }
    }
}
