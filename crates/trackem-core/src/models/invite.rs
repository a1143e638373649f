//! Group invitation domain model.
//!
//! An invite is a time-boxed offer of membership to an email address.
//! Only the SHA-256 digest of its token is ever stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invite {
    pub id: Uuid,
    /// Normalised (trimmed, lower-cased) recipient address.
    pub email: String,
    pub group_id: Uuid,
    pub invited_by_id: Uuid,
    /// Admin flag granted on acceptance.
    pub is_admin: bool,
    /// Hex-encoded SHA-256 of the raw token.
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state derived from the record and the current time.
///
/// Cancelled invites are deleted, so they never show up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InviteState {
    Pending,
    Accepted,
    Expired,
}

impl Invite {
    pub fn state_at(&self, now: DateTime<Utc>) -> InviteState {
        if self.accepted_at.is_some() {
            InviteState::Accepted
        } else if now >= self.expires_at {
            InviteState::Expired
        } else {
            InviteState::Pending
        }
    }

    pub fn is_pending_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == InviteState::Pending
    }
}

/// Input for creating an invitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvite {
    pub group_id: Uuid,
    pub email: String,
    pub is_admin: bool,
}

/// Returned once, at creation: the stored invite plus the raw token
/// that was emailed to the recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedInvite {
    pub invite: Invite,
    pub token: String,
}

/// Public view of a pending invite, readable by anyone holding the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitePreview {
    pub invite_id: Uuid,
    pub email: String,
    pub group_id: Uuid,
    pub group_name: String,
    pub inviter_name: String,
    pub is_admin: bool,
    pub expires_at: DateTime<Utc>,
    /// Whether an account already exists for the invited address.
    pub user_exists: bool,
}

/// Result of a successful acceptance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedInvite {
    pub group_id: Uuid,
    pub group_name: String,
    pub is_admin: bool,
}
