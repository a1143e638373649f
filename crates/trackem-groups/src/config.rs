//! Group services configuration.

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct GroupsConfig {
    /// How long an invite stays pending (default: 7 days).
    pub invite_lifetime_secs: i64,
    /// Random bytes per invite token before encoding (default: 32).
    pub invite_token_bytes: usize,
    /// Base URL the accept link in invite emails is built on.
    pub public_base_url: String,
}

impl GroupsConfig {
    pub fn invite_lifetime(&self) -> Duration {
        Duration::seconds(self.invite_lifetime_secs)
    }

    pub fn accept_url(&self, token: &str) -> String {
        format!(
            "{}/invite/{token}",
            self.public_base_url.trim_end_matches('/')
        )
    }
}

impl Default for GroupsConfig {
    fn default() -> Self {
        Self {
            invite_lifetime_secs: 7 * 24 * 60 * 60,
            invite_token_bytes: 32,
            public_base_url: "http://localhost:3000".into(),
        }
    }
}
