//! Activity domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::ContributionSummary;
use crate::models::contribution::Contribution;

/// A shared activity inside a group. Deleted with its group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActivity {
    pub group_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// An activity together with its computed totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub activity: Activity,
    pub summary: ContributionSummary,
}

/// A contribution as listed in an activity view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionEntry {
    pub contribution: Contribution,
    /// The contributor no longer holds a membership in the group.
    pub former_member: bool,
}

/// Full read model for a single activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDetail {
    pub activity: Activity,
    pub contributions: Vec<ContributionEntry>,
    pub summary: ContributionSummary,
}
