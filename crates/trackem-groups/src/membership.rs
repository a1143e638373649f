//! Group creation and deletion, and direct membership changes.

use chrono::Utc;
use tracing::info;
use trackem_core::authz::{GroupAction, GroupRole};
use trackem_core::error::{TrackemError, TrackemResult};
use trackem_core::models::group::{CreateGroup, Group, GroupListing};
use trackem_core::models::membership::{MemberRef, MemberView, Membership};
use trackem_core::repository::{MembershipStore, WriteStep};
use trackem_core::Identity;
use uuid::Uuid;

use crate::access;
use crate::invitation::normalize_email;

/// Resolve each membership of `group` to a [`MemberView`].
pub(crate) async fn member_views<S: MembershipStore>(
    store: &S,
    group: &Group,
    memberships: &[Membership],
) -> TrackemResult<Vec<MemberView>> {
    let mut views = Vec::with_capacity(memberships.len());
    for m in memberships {
        let user = store.get_user(m.user_id).await?;
        views.push(MemberView {
            user_id: user.id,
            username: user.username,
            email: user.email,
            role: GroupRole::derive(m.user_id, group.owner_id, Some(m)),
            joined_at: m.joined_at,
        });
    }
    Ok(views)
}

pub struct MembershipService<S: MembershipStore> {
    store: S,
}

impl<S: MembershipStore> MembershipService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create a group owned by the caller. The owner's admin membership
    /// is written in the same transaction.
    pub async fn create_group(&self, caller: Identity, input: CreateGroup) -> TrackemResult<Group> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(TrackemError::validation("group name is required"));
        }
        let owner = self.store.get_user(caller.user_id).await?;

        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: input.description.unwrap_or_default(),
            owner_id: owner.id,
            created_at: now,
        };
        let membership = Membership {
            user_id: owner.id,
            group_id: group.id,
            is_admin: true,
            joined_at: now,
        };

        self.store
            .run_transaction(vec![
                WriteStep::CreateGroup(group.clone()),
                WriteStep::CreateMembership(membership),
            ])
            .await?;

        info!(group_id = %group.id, owner_id = %owner.id, "Group created");
        Ok(group)
    }

    /// Add a user who already has an account. Requires Admin.
    pub async fn add_existing_user(
        &self,
        caller: Identity,
        group_id: Uuid,
        member: MemberRef,
        is_admin: bool,
    ) -> TrackemResult<Membership> {
        let (group, ctx) = access::load(&self.store, caller, group_id).await?;
        ctx.authorize(GroupAction::AddMember)?;

        let user = match member {
            MemberRef::Id(id) => self.store.get_user(id).await?,
            MemberRef::Email(raw) => {
                let email = normalize_email(&raw)?;
                self.store.get_user_by_email(&email).await?
            }
        };

        if self
            .store
            .get_membership(user.id, group.id)
            .await?
            .is_some()
        {
            return Err(TrackemError::conflict("user is already a member"));
        }

        let membership = self
            .store
            .create_membership(Membership {
                user_id: user.id,
                group_id: group.id,
                is_admin,
                joined_at: Utc::now(),
            })
            .await
            .map_err(|e| match e {
                TrackemError::AlreadyExists { .. } => {
                    TrackemError::conflict("user is already a member")
                }
                other => other,
            })?;

        info!(
            group_id = %group.id,
            user_id = %user.id,
            is_admin,
            added_by = %caller.user_id,
            "Member added"
        );
        Ok(membership)
    }

    /// Remove a member, or leave the group when `target` is the caller.
    /// The owner can never be removed. Contributions stay in place.
    pub async fn remove(&self, caller: Identity, group_id: Uuid, target: Uuid) -> TrackemResult<()> {
        let (group, ctx) = access::load(&self.store, caller, group_id).await?;
        ctx.authorize(GroupAction::RemoveMember { target })?;

        if self.store.get_membership(target, group.id).await?.is_none() {
            return Err(TrackemError::not_found("membership", target));
        }
        self.store.delete_membership(target, group.id).await?;

        info!(
            group_id = %group.id,
            user_id = %target,
            removed_by = %caller.user_id,
            "Member removed"
        );
        Ok(())
    }

    /// Promote or demote a member. Owner only; never the owner's own
    /// flag.
    pub async fn set_admin_flag(
        &self,
        caller: Identity,
        group_id: Uuid,
        target: Uuid,
        is_admin: bool,
    ) -> TrackemResult<Membership> {
        let (group, ctx) = access::load(&self.store, caller, group_id).await?;
        ctx.authorize(GroupAction::SetAdminFlag { target })?;

        let membership = self
            .store
            .update_membership(target, group.id, is_admin)
            .await?;

        info!(group_id = %group.id, user_id = %target, is_admin, "Admin flag changed");
        Ok(membership)
    }

    /// Delete a group with its activities, contributions, memberships
    /// and invites. Owner only.
    pub async fn delete_group(&self, caller: Identity, group_id: Uuid) -> TrackemResult<()> {
        let (group, ctx) = access::load(&self.store, caller, group_id).await?;
        ctx.authorize(GroupAction::DeleteGroup)?;

        self.store
            .run_transaction(vec![
                WriteStep::DeleteContributionsOfGroup(group.id),
                WriteStep::DeleteActivitiesOfGroup(group.id),
                WriteStep::DeleteMembershipsOfGroup(group.id),
                WriteStep::DeleteInvitesOfGroup(group.id),
                WriteStep::DeleteGroup(group.id),
            ])
            .await?;

        info!(group_id = %group.id, deleted_by = %caller.user_id, "Group deleted");
        Ok(())
    }

    pub async fn list_members(
        &self,
        caller: Identity,
        group_id: Uuid,
    ) -> TrackemResult<Vec<MemberView>> {
        let (group, ctx) = access::load(&self.store, caller, group_id).await?;
        ctx.authorize(GroupAction::ViewGroup)?;

        let memberships = self.store.list_memberships(group.id).await?;
        member_views(&self.store, &group, &memberships).await
    }

    /// Groups the caller belongs to.
    pub async fn list_groups(&self, caller: Identity) -> TrackemResult<Vec<GroupListing>> {
        self.store.list_user_groups(caller.user_id).await
    }
}
