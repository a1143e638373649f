//! Group domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A group of users running shared activities.
///
/// A group has exactly one owner for its whole lifetime; there is no
/// transfer operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroup {
    pub name: String,
    pub description: Option<String>,
}

/// A group as listed for one of its members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupListing {
    pub group: Group,
    pub member_count: u64,
    pub activity_count: u64,
    /// The listing user's own admin flag.
    pub is_admin: bool,
}

/// Member-only read model of a whole group.
///
/// Totals across activities are not required to come from a single
/// snapshot; each activity's own summary is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupOverview {
    pub group: Group,
    pub members: Vec<crate::models::membership::MemberView>,
    pub activities: Vec<crate::models::activity::ActivitySummary>,
    pub totals: crate::aggregate::ContributionSummary,
    /// Users with contributions in the group but no current membership.
    pub former_members: Vec<Uuid>,
}
