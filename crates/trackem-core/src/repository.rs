//! The storage contract consumed by the group services.
//!
//! All operations are async and either succeed or return a typed
//! [`TrackemError`](crate::error::TrackemError). Unique-index
//! violations surface as `AlreadyExists`. Multi-record writes go
//! through [`MembershipStore::run_transaction`], which applies an
//! ordered batch of [`WriteStep`]s atomically. A guarded step whose
//! precondition no longer holds fails the whole batch with `Conflict`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::TrackemResult;
use crate::models::{
    activity::Activity,
    contribution::{Contribution, ContributionScope},
    group::{Group, GroupListing},
    invite::Invite,
    membership::Membership,
    user::{CreateUser, User},
};

/// One write inside an atomic batch.
///
/// Records are fully formed by the caller (ids and timestamps
/// included) so that a batch can be replayed against any store.
#[derive(Debug, Clone)]
pub enum WriteStep {
    CreateGroup(Group),
    CreateMembership(Membership),
    SetMembershipAdmin {
        user_id: Uuid,
        group_id: Uuid,
        is_admin: bool,
    },
    DeleteMembership {
        user_id: Uuid,
        group_id: Uuid,
    },
    CreateInvite(Invite),
    /// Guarded: the invite must still be pending at `accepted_at`.
    MarkInviteAccepted {
        invite_id: Uuid,
        accepted_at: DateTime<Utc>,
    },
    /// Guarded: deletes the invite only if it is still pending at `at`.
    CancelInvite {
        invite_id: Uuid,
        at: DateTime<Utc>,
    },
    DeleteInvite(Uuid),
    DeleteContributionsOfActivity(Uuid),
    DeleteActivity(Uuid),
    /// Every contribution to any activity of the group.
    DeleteContributionsOfGroup(Uuid),
    DeleteActivitiesOfGroup(Uuid),
    DeleteMembershipsOfGroup(Uuid),
    DeleteInvitesOfGroup(Uuid),
    DeleteGroup(Uuid),
}

pub trait MembershipStore: Send + Sync {
    // -- users ------------------------------------------------------------

    fn create_user(&self, input: CreateUser) -> impl Future<Output = TrackemResult<User>> + Send;
    fn get_user(&self, id: Uuid) -> impl Future<Output = TrackemResult<User>> + Send;
    fn get_user_by_email(&self, email: &str) -> impl Future<Output = TrackemResult<User>> + Send;

    // -- groups & memberships ---------------------------------------------

    fn get_group(&self, id: Uuid) -> impl Future<Output = TrackemResult<Group>> + Send;
    /// Groups the user currently belongs to, with member and activity
    /// counts.
    fn list_user_groups(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = TrackemResult<Vec<GroupListing>>> + Send;
    /// Returns `Ok(None)` when the user is not a member.
    fn get_membership(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> impl Future<Output = TrackemResult<Option<Membership>>> + Send;
    fn list_memberships(
        &self,
        group_id: Uuid,
    ) -> impl Future<Output = TrackemResult<Vec<Membership>>> + Send;
    fn create_membership(
        &self,
        membership: Membership,
    ) -> impl Future<Output = TrackemResult<Membership>> + Send;
    fn update_membership(
        &self,
        user_id: Uuid,
        group_id: Uuid,
        is_admin: bool,
    ) -> impl Future<Output = TrackemResult<Membership>> + Send;
    fn delete_membership(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> impl Future<Output = TrackemResult<()>> + Send;

    // -- invites ----------------------------------------------------------

    fn create_invite(&self, invite: Invite) -> impl Future<Output = TrackemResult<Invite>> + Send;
    fn get_invite(&self, id: Uuid) -> impl Future<Output = TrackemResult<Invite>> + Send;
    fn get_invite_by_token(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = TrackemResult<Invite>> + Send;
    /// The invite for `(email, group_id)` in any state, if one exists.
    fn find_invite(
        &self,
        email: &str,
        group_id: Uuid,
    ) -> impl Future<Output = TrackemResult<Option<Invite>>> + Send;
    /// Unaccepted invites of the group that expire after `now`.
    fn list_pending_invites(
        &self,
        group_id: Uuid,
        now: DateTime<Utc>,
    ) -> impl Future<Output = TrackemResult<Vec<Invite>>> + Send;
    fn delete_invite(&self, id: Uuid) -> impl Future<Output = TrackemResult<()>> + Send;

    // -- activities & contributions ---------------------------------------

    fn create_activity(
        &self,
        activity: Activity,
    ) -> impl Future<Output = TrackemResult<Activity>> + Send;
    fn get_activity(&self, id: Uuid) -> impl Future<Output = TrackemResult<Activity>> + Send;
    fn list_activities(
        &self,
        group_id: Uuid,
    ) -> impl Future<Output = TrackemResult<Vec<Activity>>> + Send;
    fn create_contribution(
        &self,
        contribution: Contribution,
    ) -> impl Future<Output = TrackemResult<Contribution>> + Send;
    fn get_contribution(
        &self,
        id: Uuid,
    ) -> impl Future<Output = TrackemResult<Contribution>> + Send;
    /// Overwrite the type, amount, currency and description of an
    /// existing contribution.
    fn update_contribution(
        &self,
        contribution: Contribution,
    ) -> impl Future<Output = TrackemResult<Contribution>> + Send;
    fn delete_contribution(&self, id: Uuid) -> impl Future<Output = TrackemResult<()>> + Send;
    /// All contributions in scope, fetched by a single query.
    fn list_contributions(
        &self,
        scope: ContributionScope,
    ) -> impl Future<Output = TrackemResult<Vec<Contribution>>> + Send;

    // -- batches ----------------------------------------------------------

    /// Apply every step or none of them.
    fn run_transaction(
        &self,
        steps: Vec<WriteStep>,
    ) -> impl Future<Output = TrackemResult<()>> + Send;
}
