//! Authentication configuration.

/// Configuration for token issuance and verification.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 private key for session token signing.
    pub jwt_private_key_pem: String,
    /// PEM-encoded Ed25519 public key for session token verification.
    pub jwt_public_key_pem: String,
    /// JWT issuer (`iss` claim) of session tokens.
    pub jwt_issuer: String,
    /// Session token lifetime in seconds (default: 86_400 = 24 hours).
    pub session_token_lifetime_secs: u64,
    /// Shared HS256 secret of legacy bearer tokens. `None` disables the
    /// legacy scheme.
    pub legacy_jwt_secret: Option<String>,
    /// Legacy bearer token lifetime in seconds (default: 86_400).
    pub legacy_token_lifetime_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            jwt_issuer: "trackem".into(),
            session_token_lifetime_secs: 86_400,
            legacy_jwt_secret: None,
            legacy_token_lifetime_secs: 86_400,
        }
    }
}
