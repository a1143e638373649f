//! Outbound invite email.
//!
//! Delivery is best-effort: the invitation flow logs a failed send and
//! carries on.

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email transport failed: {0}")]
    Transport(String),

    #[error("recipient rejected: {0}")]
    Rejected(String),
}

/// Everything an invite email needs.
#[derive(Debug, Clone)]
pub struct InviteEmail {
    pub to: String,
    pub group_name: String,
    pub inviter_name: String,
    /// Raw invite token. Only ever travels in the email.
    pub token: String,
    pub accept_url: String,
    pub is_admin: bool,
}

pub trait EmailSender: Send + Sync {
    fn send_invite(
        &self,
        email: &InviteEmail,
    ) -> impl Future<Output = Result<(), EmailError>> + Send;
}

/// Writes invites to the log instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    async fn send_invite(&self, email: &InviteEmail) -> Result<(), EmailError> {
        info!(
            to = %email.to,
            group = %email.group_name,
            inviter = %email.inviter_name,
            is_admin = email.is_admin,
            "Invite email (log transport)"
        );
        Ok(())
    }
}
