//! Command line and environment configuration.

use std::path::PathBuf;

use clap::Parser;
use trackem_auth::AuthConfig;
use trackem_db::DbConfig;
use trackem_groups::GroupsConfig;

use crate::error::{ServerError, ServerResult};

/// TrackEm server
#[derive(Debug, Parser)]
#[command(name = "trackem")]
#[command(about = "Group activity and contribution tracking", long_about = None)]
#[command(version)]
pub struct ServerArgs {
    /// SurrealDB endpoint
    #[arg(long, env = "TRACKEM_DB_URL", default_value = "ws://127.0.0.1:8000")]
    pub db_url: String,

    /// Run against the embedded in-memory engine instead of `db_url`
    #[arg(long, env = "TRACKEM_MEMORY")]
    pub memory: bool,

    #[arg(long, env = "TRACKEM_DB_NAMESPACE", default_value = "trackem")]
    pub db_namespace: String,

    #[arg(long, env = "TRACKEM_DB_DATABASE", default_value = "main")]
    pub db_database: String,

    #[arg(long, env = "TRACKEM_DB_USER", default_value = "root")]
    pub db_user: String,

    #[arg(long, env = "TRACKEM_DB_PASSWORD", default_value = "root", hide_env_values = true)]
    pub db_password: String,

    /// PEM file with the Ed25519 session signing key
    #[arg(long, env = "TRACKEM_JWT_PRIVATE_KEY")]
    pub jwt_private_key: Option<PathBuf>,

    /// PEM file with the Ed25519 session verification key
    #[arg(long, env = "TRACKEM_JWT_PUBLIC_KEY")]
    pub jwt_public_key: Option<PathBuf>,

    #[arg(long, env = "TRACKEM_JWT_ISSUER", default_value = "trackem")]
    pub jwt_issuer: String,

    #[arg(long, env = "TRACKEM_SESSION_LIFETIME_SECS", default_value_t = 86_400)]
    pub session_lifetime_secs: u64,

    /// Shared secret of legacy bearer tokens; unset disables them
    #[arg(long, env = "TRACKEM_LEGACY_JWT_SECRET", hide_env_values = true)]
    pub legacy_jwt_secret: Option<String>,

    #[arg(long, env = "TRACKEM_LEGACY_LIFETIME_SECS", default_value_t = 86_400)]
    pub legacy_lifetime_secs: u64,

    #[arg(long, env = "TRACKEM_INVITE_LIFETIME_SECS", default_value_t = 604_800)]
    pub invite_lifetime_secs: i64,

    /// Base URL used to build invite accept links
    #[arg(long, env = "TRACKEM_PUBLIC_URL", default_value = "http://localhost:3000")]
    pub public_url: String,

    /// Create a global admin with this email on startup if none exists
    #[arg(long, env = "TRACKEM_BOOTSTRAP_ADMIN")]
    pub bootstrap_admin: Option<String>,

    #[arg(long, env = "TRACKEM_LOG_JSON", default_value_t = true, action = clap::ArgAction::Set)]
    pub log_json: bool,
}

impl ServerArgs {
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: if self.memory {
                "mem://".into()
            } else {
                self.db_url.clone()
            },
            namespace: self.db_namespace.clone(),
            database: self.db_database.clone(),
            username: self.db_user.clone(),
            password: self.db_password.clone(),
        }
    }

    pub fn auth_config(&self) -> ServerResult<AuthConfig> {
        let (jwt_private_key_pem, jwt_public_key_pem) =
            match (&self.jwt_private_key, &self.jwt_public_key) {
                (Some(private), Some(public)) => (
                    std::fs::read_to_string(private)?,
                    std::fs::read_to_string(public)?,
                ),
                (None, None) => (String::new(), String::new()),
                _ => {
                    return Err(ServerError::Config(
                        "session keys must be given as a pair".into(),
                    ));
                }
            };

        Ok(AuthConfig {
            jwt_private_key_pem,
            jwt_public_key_pem,
            jwt_issuer: self.jwt_issuer.clone(),
            session_token_lifetime_secs: self.session_lifetime_secs,
            legacy_jwt_secret: self.legacy_jwt_secret.clone(),
            legacy_token_lifetime_secs: self.legacy_lifetime_secs,
        })
    }

    pub fn groups_config(&self) -> ServerResult<GroupsConfig> {
        if self.invite_lifetime_secs <= 0 {
            return Err(ServerError::Config(
                "invite lifetime must be positive".into(),
            ));
        }
        Ok(GroupsConfig {
            invite_lifetime_secs: self.invite_lifetime_secs,
            public_base_url: self.public_url.clone(),
            ..GroupsConfig::default()
        })
    }
}
