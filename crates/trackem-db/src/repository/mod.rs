//! SurrealDB implementation of [`MembershipStore`].
//!
//! Queries are grouped per entity in the sibling modules as inherent
//! methods on [`SurrealMembershipStore`]; the trait impl below only
//! delegates and converts [`DbError`] into the core taxonomy.

mod activity;
mod contribution;
mod group;
mod invite;
mod membership;
mod transaction;
mod user;

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use trackem_core::error::TrackemResult;
use trackem_core::models::{
    activity::Activity,
    contribution::{Contribution, ContributionScope},
    group::{Group, GroupListing},
    invite::Invite,
    membership::Membership,
    user::{CreateUser, User},
};
use trackem_core::repository::{MembershipStore, WriteStep};
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    total: u64,
}

pub(crate) fn first_count(rows: &[CountRow]) -> u64 {
    rows.first().map(|r| r.total).unwrap_or(0)
}

pub(crate) fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}

/// SurrealDB-backed store for users, groups, memberships, invites,
/// activities and contributions.
pub struct SurrealMembershipStore<C: Connection> {
    db: Surreal<C>,
}

// Cloning shares the underlying connection.
impl<C: Connection> Clone for SurrealMembershipStore<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealMembershipStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MembershipStore for SurrealMembershipStore<C> {
    async fn create_user(&self, input: CreateUser) -> TrackemResult<User> {
        Ok(self.insert_user(input).await?)
    }

    async fn get_user(&self, id: Uuid) -> TrackemResult<User> {
        Ok(self.fetch_user(id).await?)
    }

    async fn get_user_by_email(&self, email: &str) -> TrackemResult<User> {
        Ok(self.fetch_user_by_email(email).await?)
    }

    async fn get_group(&self, id: Uuid) -> TrackemResult<Group> {
        Ok(self.fetch_group(id).await?)
    }

    async fn list_user_groups(&self, user_id: Uuid) -> TrackemResult<Vec<GroupListing>> {
        Ok(self.fetch_user_groups(user_id).await?)
    }

    async fn get_membership(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> TrackemResult<Option<Membership>> {
        Ok(self.fetch_membership(user_id, group_id).await?)
    }

    async fn list_memberships(&self, group_id: Uuid) -> TrackemResult<Vec<Membership>> {
        Ok(self.fetch_memberships(group_id).await?)
    }

    async fn create_membership(&self, membership: Membership) -> TrackemResult<Membership> {
        Ok(self.relate_membership(membership).await?)
    }

    async fn update_membership(
        &self,
        user_id: Uuid,
        group_id: Uuid,
        is_admin: bool,
    ) -> TrackemResult<Membership> {
        Ok(self
            .set_membership_admin(user_id, group_id, is_admin)
            .await?)
    }

    async fn delete_membership(&self, user_id: Uuid, group_id: Uuid) -> TrackemResult<()> {
        Ok(self.remove_membership(user_id, group_id).await?)
    }

    async fn create_invite(&self, invite: Invite) -> TrackemResult<Invite> {
        Ok(self.insert_invite(invite).await?)
    }

    async fn get_invite(&self, id: Uuid) -> TrackemResult<Invite> {
        Ok(self.fetch_invite(id).await?)
    }

    async fn get_invite_by_token(&self, token_hash: &str) -> TrackemResult<Invite> {
        Ok(self.fetch_invite_by_token(token_hash).await?)
    }

    async fn find_invite(&self, email: &str, group_id: Uuid) -> TrackemResult<Option<Invite>> {
        Ok(self.fetch_invite_for(email, group_id).await?)
    }

    async fn list_pending_invites(
        &self,
        group_id: Uuid,
        now: DateTime<Utc>,
    ) -> TrackemResult<Vec<Invite>> {
        Ok(self.fetch_pending_invites(group_id, now).await?)
    }

    async fn delete_invite(&self, id: Uuid) -> TrackemResult<()> {
        Ok(self.remove_invite(id).await?)
    }

    async fn create_activity(&self, activity: Activity) -> TrackemResult<Activity> {
        Ok(self.insert_activity(activity).await?)
    }

    async fn get_activity(&self, id: Uuid) -> TrackemResult<Activity> {
        Ok(self.fetch_activity(id).await?)
    }

    async fn list_activities(&self, group_id: Uuid) -> TrackemResult<Vec<Activity>> {
        Ok(self.fetch_activities(group_id).await?)
    }

    async fn create_contribution(&self, contribution: Contribution) -> TrackemResult<Contribution> {
        Ok(self.insert_contribution(contribution).await?)
    }

    async fn get_contribution(&self, id: Uuid) -> TrackemResult<Contribution> {
        Ok(self.fetch_contribution(id).await?)
    }

    async fn update_contribution(&self, contribution: Contribution) -> TrackemResult<Contribution> {
        Ok(self.modify_contribution(contribution).await?)
    }

    async fn delete_contribution(&self, id: Uuid) -> TrackemResult<()> {
        Ok(self.remove_contribution(id).await?)
    }

    async fn list_contributions(&self, scope: ContributionScope) -> TrackemResult<Vec<Contribution>> {
        Ok(self.fetch_contributions(scope).await?)
    }

    async fn run_transaction(&self, steps: Vec<WriteStep>) -> TrackemResult<()> {
        Ok(self.apply_batch(steps).await?)
    }
}
