//! Membership domain model: the `(user, group)` relation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authz::GroupRole;

/// A user's membership in a group. Unique per `(user_id, group_id)`.
///
/// The owner's membership always has `is_admin = true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub is_admin: bool,
    pub joined_at: DateTime<Utc>,
}

/// Target of an add-member request: an existing user, by id or email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberRef {
    Id(Uuid),
    Email(String),
}

/// A member as shown in a group view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberView {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}
