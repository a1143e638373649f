//! Per-user dashboard read model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::contribution::Contribution;
use crate::models::group::GroupListing;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub group_count: u64,
    pub admin_group_count: u64,
    pub contribution_count: u64,
    /// Distinct activities the user contributed to.
    pub activity_count: u64,
}

/// A contribution with the names needed to show it out of context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentContribution {
    pub contribution: Contribution,
    pub activity_name: String,
    pub group_id: Uuid,
    pub group_name: String,
}

/// What a signed-in user sees first: their standing across groups and
/// their latest contributions, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_groups: Vec<GroupListing>,
    pub recent_contributions: Vec<RecentContribution>,
}
