//! Contribution domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContributionType {
    Money,
    /// Amount is a number of minutes.
    Time,
}

/// A single recorded unit of money or time.
///
/// Contributions outlive their contributor's membership; they stay
/// attributed to `user_id` after the user leaves the group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_id: Uuid,
    pub contribution_type: ContributionType,
    pub amount: f64,
    /// Present iff `contribution_type` is `Money`.
    pub currency: Option<String>,
    pub description: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContribution {
    pub user_id: Uuid,
    pub activity_id: Uuid,
    pub contribution_type: ContributionType,
    pub amount: f64,
    pub currency: Option<String>,
    pub description: Option<String>,
    /// Defaults to the time of recording.
    pub date: Option<DateTime<Utc>>,
}

/// A partial edit of a contribution. `None` leaves a field unchanged.
///
/// Switching to `Time` drops the stored currency unless one is given,
/// in which case validation rejects it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateContribution {
    pub contribution_type: Option<ContributionType>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub description: Option<String>,
}

/// Which contributions a store query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributionScope {
    Activity(Uuid),
    Group(Uuid),
    /// Everything one user contributed, across all groups.
    User(Uuid),
}
