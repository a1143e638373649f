//! Activities, contributions and their summaries.
//!
//! Every summary is computed from a single contribution fetch so that
//! counts and totals describe the same set of rows.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::Utc;
use tracing::info;
use trackem_core::aggregate::summarize;
use trackem_core::authz::GroupAction;
use trackem_core::error::{TrackemError, TrackemResult};
use trackem_core::models::activity::{
    Activity, ActivityDetail, ActivitySummary, ContributionEntry, CreateActivity,
};
use trackem_core::models::contribution::{
    Contribution, ContributionScope, ContributionType, CreateContribution, UpdateContribution,
};
use trackem_core::models::dashboard::{Dashboard, DashboardStats, RecentContribution};
use trackem_core::models::group::GroupOverview;
use trackem_core::repository::{MembershipStore, WriteStep};
use trackem_core::Identity;
use uuid::Uuid;

use crate::access;
use crate::membership::member_views;

/// Groups and contributions shown on the dashboard.
const DASHBOARD_RECENT: usize = 5;

/// Check amount and currency, returning the normalised currency.
fn validate_contribution(
    kind: ContributionType,
    amount: f64,
    currency: Option<&str>,
) -> TrackemResult<Option<String>> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(TrackemError::validation("amount must be positive"));
    }
    let currency = currency
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_uppercase);

    match (kind, currency) {
        (ContributionType::Money, None) => Err(TrackemError::validation(
            "currency is required for money contributions",
        )),
        (ContributionType::Money, Some(c)) => Ok(Some(c)),
        (ContributionType::Time, None) => Ok(None),
        (ContributionType::Time, Some(_)) => Err(TrackemError::validation(
            "time contributions carry no currency",
        )),
    }
}

pub struct ActivityService<S: MembershipStore> {
    store: S,
}

impl<S: MembershipStore> ActivityService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Requires Admin.
    pub async fn create_activity(
        &self,
        caller: Identity,
        input: CreateActivity,
    ) -> TrackemResult<Activity> {
        let (group, ctx) = access::load(&self.store, caller, input.group_id).await?;
        ctx.authorize(GroupAction::ManageActivities)?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(TrackemError::validation("activity name is required"));
        }

        let activity = self
            .store
            .create_activity(Activity {
                id: Uuid::new_v4(),
                group_id: group.id,
                name: name.to_string(),
                description: input.description.unwrap_or_default(),
                created_at: Utc::now(),
            })
            .await?;

        info!(activity_id = %activity.id, group_id = %group.id, "Activity created");
        Ok(activity)
    }

    /// Delete an activity and its contributions. Requires Admin.
    pub async fn delete_activity(&self, caller: Identity, activity_id: Uuid) -> TrackemResult<()> {
        let activity = self.store.get_activity(activity_id).await?;
        let (_, ctx) = access::load(&self.store, caller, activity.group_id).await?;
        ctx.authorize(GroupAction::ManageActivities)?;

        self.store
            .run_transaction(vec![
                WriteStep::DeleteContributionsOfActivity(activity.id),
                WriteStep::DeleteActivity(activity.id),
            ])
            .await?;

        info!(activity_id = %activity.id, group_id = %activity.group_id, "Activity deleted");
        Ok(())
    }

    /// Activities of a group, each with its summary. Requires Member.
    pub async fn list_activities(
        &self,
        caller: Identity,
        group_id: Uuid,
    ) -> TrackemResult<Vec<ActivitySummary>> {
        let (group, ctx) = access::load(&self.store, caller, group_id).await?;
        ctx.authorize(GroupAction::ViewGroup)?;

        let activities = self.store.list_activities(group.id).await?;
        let contributions = self
            .store
            .list_contributions(ContributionScope::Group(group.id))
            .await?;
        Ok(summaries(activities, &contributions))
    }

    /// Record a contribution. Requires group Admin or global admin; the
    /// contributor must be a current member.
    pub async fn add_contribution(
        &self,
        caller: Identity,
        input: CreateContribution,
    ) -> TrackemResult<Contribution> {
        let activity = self.store.get_activity(input.activity_id).await?;
        let (group, ctx) = access::load(&self.store, caller, activity.group_id).await?;
        ctx.authorize(GroupAction::AddContribution)?;

        let currency = validate_contribution(
            input.contribution_type,
            input.amount,
            input.currency.as_deref(),
        )?;
        if self
            .store
            .get_membership(input.user_id, group.id)
            .await?
            .is_none()
        {
            return Err(TrackemError::validation("contributor is not a group member"));
        }

        let contribution = self
            .store
            .create_contribution(Contribution {
                id: Uuid::new_v4(),
                user_id: input.user_id,
                activity_id: activity.id,
                contribution_type: input.contribution_type,
                amount: input.amount,
                currency,
                description: input.description.unwrap_or_default(),
                date: input.date.unwrap_or_else(Utc::now),
            })
            .await?;

        info!(
            contribution_id = %contribution.id,
            activity_id = %activity.id,
            user_id = %contribution.user_id,
            recorded_by = %caller.user_id,
            "Contribution added"
        );
        Ok(contribution)
    }

    /// Requires Member, or global admin.
    pub async fn get_contribution(
        &self,
        caller: Identity,
        contribution_id: Uuid,
    ) -> TrackemResult<Contribution> {
        let contribution = self.store.get_contribution(contribution_id).await?;
        let activity = self.store.get_activity(contribution.activity_id).await?;
        let (_, ctx) = access::load(&self.store, caller, activity.group_id).await?;
        ctx.authorize(GroupAction::ViewContribution)?;

        Ok(contribution)
    }

    /// Edit type, amount, currency or description. Requires group Admin
    /// or global admin. The merged record is validated as a new one
    /// would be; contributor, activity and date never change.
    pub async fn update_contribution(
        &self,
        caller: Identity,
        contribution_id: Uuid,
        input: UpdateContribution,
    ) -> TrackemResult<Contribution> {
        let existing = self.store.get_contribution(contribution_id).await?;
        let activity = self.store.get_activity(existing.activity_id).await?;
        let (_, ctx) = access::load(&self.store, caller, activity.group_id).await?;
        ctx.authorize(GroupAction::UpdateContribution)?;

        let kind = input
            .contribution_type
            .unwrap_or(existing.contribution_type);
        let amount = input.amount.unwrap_or(existing.amount);
        let currency = match (kind, input.currency) {
            (_, Some(given)) => Some(given),
            (ContributionType::Money, None) => existing.currency.clone(),
            (ContributionType::Time, None) => None,
        };
        let currency = validate_contribution(kind, amount, currency.as_deref())?;

        let updated = self
            .store
            .update_contribution(Contribution {
                contribution_type: kind,
                amount,
                currency,
                description: input.description.unwrap_or(existing.description),
                ..existing
            })
            .await?;

        info!(
            contribution_id = %updated.id,
            updated_by = %caller.user_id,
            "Contribution updated"
        );
        Ok(updated)
    }

    /// Requires group Admin or global admin.
    pub async fn delete_contribution(
        &self,
        caller: Identity,
        contribution_id: Uuid,
    ) -> TrackemResult<()> {
        let contribution = self.store.get_contribution(contribution_id).await?;
        let activity = self.store.get_activity(contribution.activity_id).await?;
        let (_, ctx) = access::load(&self.store, caller, activity.group_id).await?;
        ctx.authorize(GroupAction::DeleteContribution)?;

        self.store.delete_contribution(contribution.id).await?;

        info!(
            contribution_id = %contribution.id,
            deleted_by = %caller.user_id,
            "Contribution deleted"
        );
        Ok(())
    }

    /// One activity with every contribution and their summary. Requires
    /// Member. Contributors who have since left are flagged.
    pub async fn activity_detail(
        &self,
        caller: Identity,
        activity_id: Uuid,
    ) -> TrackemResult<ActivityDetail> {
        let activity = self.store.get_activity(activity_id).await?;
        let (group, ctx) = access::load(&self.store, caller, activity.group_id).await?;
        ctx.authorize(GroupAction::ViewGroup)?;

        let contributions = self
            .store
            .list_contributions(ContributionScope::Activity(activity.id))
            .await?;
        let members: HashSet<Uuid> = self
            .store
            .list_memberships(group.id)
            .await?
            .into_iter()
            .map(|m| m.user_id)
            .collect();

        let summary = summarize(&contributions);
        let contributions = contributions
            .into_iter()
            .map(|c| ContributionEntry {
                former_member: !members.contains(&c.user_id),
                contribution: c,
            })
            .collect();

        Ok(ActivityDetail {
            activity,
            contributions,
            summary,
        })
    }

    /// Members, per-activity summaries and group-wide totals. Requires
    /// Member.
    pub async fn group_overview(
        &self,
        caller: Identity,
        group_id: Uuid,
    ) -> TrackemResult<GroupOverview> {
        let (group, ctx) = access::load(&self.store, caller, group_id).await?;
        ctx.authorize(GroupAction::ViewGroup)?;

        let memberships = self.store.list_memberships(group.id).await?;
        let members = member_views(&self.store, &group, &memberships).await?;
        let activities = self.store.list_activities(group.id).await?;
        let contributions = self
            .store
            .list_contributions(ContributionScope::Group(group.id))
            .await?;

        let current: HashSet<Uuid> = memberships.iter().map(|m| m.user_id).collect();
        let former_members = contributions
            .iter()
            .map(|c| c.user_id)
            .filter(|id| !current.contains(id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let totals = summarize(&contributions);
        let activities = summaries(activities, &contributions);

        Ok(GroupOverview {
            group,
            members,
            activities,
            totals,
            former_members,
        })
    }

    /// The caller's groups and contributions across all of them. Needs
    /// no group role: it only ever shows the caller's own data.
    pub async fn dashboard(&self, caller: Identity) -> TrackemResult<Dashboard> {
        let groups = self.store.list_user_groups(caller.user_id).await?;
        let mut contributions = self
            .store
            .list_contributions(ContributionScope::User(caller.user_id))
            .await?;
        contributions.reverse();

        let stats = DashboardStats {
            group_count: groups.len() as u64,
            admin_group_count: groups.iter().filter(|g| g.is_admin).count() as u64,
            contribution_count: contributions.len() as u64,
            activity_count: contributions
                .iter()
                .map(|c| c.activity_id)
                .collect::<HashSet<_>>()
                .len() as u64,
        };

        let mut activities: HashMap<Uuid, Activity> = HashMap::new();
        let mut group_names: HashMap<Uuid, String> = HashMap::new();
        let mut recent_contributions = Vec::with_capacity(DASHBOARD_RECENT);
        for contribution in contributions.into_iter().take(DASHBOARD_RECENT) {
            if !activities.contains_key(&contribution.activity_id) {
                let activity = self.store.get_activity(contribution.activity_id).await?;
                activities.insert(activity.id, activity);
            }
            let activity = &activities[&contribution.activity_id];
            if !group_names.contains_key(&activity.group_id) {
                let group = self.store.get_group(activity.group_id).await?;
                group_names.insert(group.id, group.name);
            }
            recent_contributions.push(RecentContribution {
                activity_name: activity.name.clone(),
                group_id: activity.group_id,
                group_name: group_names[&activity.group_id].clone(),
                contribution,
            });
        }

        let mut recent_groups = groups;
        recent_groups.reverse();
        recent_groups.truncate(DASHBOARD_RECENT);

        Ok(Dashboard {
            stats,
            recent_groups,
            recent_contributions,
        })
    }
}

fn summaries(activities: Vec<Activity>, contributions: &[Contribution]) -> Vec<ActivitySummary> {
    let mut by_activity: HashMap<Uuid, Vec<Contribution>> = HashMap::new();
    for c in contributions {
        by_activity.entry(c.activity_id).or_default().push(c.clone());
    }

    activities
        .into_iter()
        .map(|activity| {
            let summary = by_activity
                .get(&activity.id)
                .map(|cs| summarize(cs))
                .unwrap_or_default();
            ActivitySummary { activity, summary }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_needs_currency() {
        let err = validate_contribution(ContributionType::Money, 10.0, None).unwrap_err();
        assert!(matches!(err, TrackemError::Validation { .. }));

        let blank = validate_contribution(ContributionType::Money, 10.0, Some("  "));
        assert!(blank.is_err());
    }

    #[test]
    fn currency_is_uppercased() {
        let currency =
            validate_contribution(ContributionType::Money, 10.0, Some(" eur ")).unwrap();
        assert_eq!(currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn time_rejects_currency() {
        assert!(validate_contribution(ContributionType::Time, 30.0, None).is_ok());
        assert!(validate_contribution(ContributionType::Time, 30.0, Some("USD")).is_err());
    }

    #[test]
    fn amount_must_be_positive_and_finite() {
        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(
                validate_contribution(ContributionType::Time, amount, None).is_err(),
                "{amount} should be rejected"
            );
        }
    }
}
