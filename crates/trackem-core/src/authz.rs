//! Group role derivation and permission decisions.
//!
//! Everything here is a pure function of the caller's identity, the
//! group's owner and the caller's membership row. Services load those
//! inputs from the store and ask [`AccessContext::authorize`] before
//! mutating anything.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TrackemError, TrackemResult};
use crate::identity::Identity;
use crate::models::group::Group;
use crate::models::membership::Membership;

/// Effective role of a user inside one group.
///
/// Ordered so that `Owner > Admin > Member > None`; the owner is always
/// also an admin for permission purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupRole {
    None,
    Member,
    Admin,
    Owner,
}

impl GroupRole {
    /// Derive a role from the group owner and the subject's membership
    /// row (if any).
    pub fn derive(subject: Uuid, owner_id: Uuid, membership: Option<&Membership>) -> Self {
        if subject == owner_id {
            return Self::Owner;
        }
        match membership {
            Some(m) if m.is_admin => Self::Admin,
            Some(_) => Self::Member,
            None => Self::None,
        }
    }

    /// Derive a role by searching a group's full membership list.
    pub fn from_memberships(subject: Uuid, owner_id: Uuid, memberships: &[Membership]) -> Self {
        let own = memberships.iter().find(|m| m.user_id == subject);
        Self::derive(subject, owner_id, own)
    }

    pub fn is_at_least(self, minimum: GroupRole) -> bool {
        self >= minimum
    }
}

/// Something a caller may try to do inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAction {
    /// Read member-only data: the group, its members and activities.
    ViewGroup,
    /// Read a single contribution.
    ViewContribution,
    AddContribution,
    UpdateContribution,
    DeleteContribution,
    /// Create or delete activities.
    ManageActivities,
    AddMember,
    /// Send, list and cancel invitations.
    ManageInvites,
    RemoveMember { target: Uuid },
    SetAdminFlag { target: Uuid },
    DeleteGroup,
}

/// Everything needed to decide on a [`GroupAction`].
#[derive(Debug, Clone, Copy)]
pub struct AccessContext {
    pub identity: Identity,
    pub owner_id: Uuid,
    pub role: GroupRole,
}

impl AccessContext {
    pub fn new(identity: Identity, group: &Group, membership: Option<&Membership>) -> Self {
        Self {
            identity,
            owner_id: group.owner_id,
            role: GroupRole::derive(identity.user_id, group.owner_id, membership),
        }
    }

    /// Rules are checked top to bottom. The "never" rules come first so
    /// they deny even the owner.
    pub fn permits(&self, action: GroupAction) -> bool {
        let caller = self.identity.user_id;
        match action {
            GroupAction::RemoveMember { target } if target == self.owner_id => false,
            GroupAction::SetAdminFlag { target } if target == caller => false,
            GroupAction::SetAdminFlag { target } if target == self.owner_id => false,

            GroupAction::RemoveMember { target } if target == caller => {
                self.role.is_at_least(GroupRole::Member)
            }
            GroupAction::RemoveMember { .. } => self.role.is_at_least(GroupRole::Admin),
            GroupAction::SetAdminFlag { .. } | GroupAction::DeleteGroup => {
                self.role == GroupRole::Owner
            }
            GroupAction::AddContribution
            | GroupAction::UpdateContribution
            | GroupAction::DeleteContribution => {
                self.role.is_at_least(GroupRole::Admin) || self.identity.is_global_admin
            }
            GroupAction::ViewContribution => {
                self.role.is_at_least(GroupRole::Member) || self.identity.is_global_admin
            }
            GroupAction::ManageActivities
            | GroupAction::AddMember
            | GroupAction::ManageInvites => self.role.is_at_least(GroupRole::Admin),
            GroupAction::ViewGroup => self.role.is_at_least(GroupRole::Member),
        }
    }

    pub fn authorize(&self, action: GroupAction) -> TrackemResult<()> {
        if self.permits(action) {
            Ok(())
        } else {
            Err(TrackemError::PermissionDenied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct Fixture {
        group: Group,
        admin: Uuid,
        member: Uuid,
        outsider: Uuid,
        memberships: Vec<Membership>,
    }

    fn fixture() -> Fixture {
        let owner = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let member = Uuid::new_v4();
        let group = Group {
            id: Uuid::new_v4(),
            name: "Allotment".into(),
            description: String::new(),
            owner_id: owner,
            created_at: Utc::now(),
        };
        let row = |user_id, is_admin| Membership {
            user_id,
            group_id: group.id,
            is_admin,
            joined_at: Utc::now(),
        };
        let memberships = vec![row(owner, true), row(admin, true), row(member, false)];
        Fixture {
            group,
            admin,
            member,
            outsider: Uuid::new_v4(),
            memberships,
        }
    }

    fn ctx(f: &Fixture, identity: Identity) -> AccessContext {
        let own = f.memberships.iter().find(|m| m.user_id == identity.user_id);
        AccessContext::new(identity, &f.group, own)
    }

    #[test]
    fn roles_are_derived_from_owner_and_membership() {
        let f = fixture();
        let owner = f.group.owner_id;
        let role = |u| GroupRole::from_memberships(u, owner, &f.memberships);
        assert_eq!(role(owner), GroupRole::Owner);
        assert_eq!(role(f.admin), GroupRole::Admin);
        assert_eq!(role(f.member), GroupRole::Member);
        assert_eq!(role(f.outsider), GroupRole::None);
    }

    #[test]
    fn owner_is_owner_even_without_membership_row() {
        let owner = Uuid::new_v4();
        assert_eq!(GroupRole::derive(owner, owner, None), GroupRole::Owner);
    }

    #[test]
    fn role_order_is_total() {
        assert!(GroupRole::Owner > GroupRole::Admin);
        assert!(GroupRole::Admin > GroupRole::Member);
        assert!(GroupRole::Member > GroupRole::None);
        assert!(GroupRole::Owner.is_at_least(GroupRole::Admin));
    }

    #[test]
    fn owner_can_never_be_removed_or_demoted() {
        let f = fixture();
        let owner = f.group.owner_id;
        for caller in [owner, f.admin, f.member, f.outsider] {
            for global in [false, true] {
                let c = ctx(
                    &f,
                    Identity {
                        user_id: caller,
                        is_global_admin: global,
                    },
                );
                assert!(!c.permits(GroupAction::RemoveMember { target: owner }));
                assert!(!c.permits(GroupAction::SetAdminFlag { target: owner }));
            }
        }
    }

    #[test]
    fn nobody_changes_their_own_admin_flag() {
        let f = fixture();
        for caller in [f.group.owner_id, f.admin, f.member] {
            let c = ctx(&f, Identity::user(caller));
            assert!(!c.permits(GroupAction::SetAdminFlag { target: caller }));
        }
    }

    #[test]
    fn only_owner_promotes_and_deletes() {
        let f = fixture();
        let owner = ctx(&f, Identity::user(f.group.owner_id));
        let admin = ctx(&f, Identity::user(f.admin));

        assert!(owner.permits(GroupAction::SetAdminFlag { target: f.member }));
        assert!(owner.permits(GroupAction::DeleteGroup));
        assert!(!admin.permits(GroupAction::SetAdminFlag { target: f.member }));
        assert!(!admin.permits(GroupAction::DeleteGroup));
    }

    #[test]
    fn self_removal_needs_membership_other_removal_needs_admin() {
        let f = fixture();
        let member = ctx(&f, Identity::user(f.member));
        let admin = ctx(&f, Identity::user(f.admin));
        let outsider = ctx(&f, Identity::user(f.outsider));

        assert!(member.permits(GroupAction::RemoveMember { target: f.member }));
        assert!(!member.permits(GroupAction::RemoveMember { target: f.admin }));
        assert!(admin.permits(GroupAction::RemoveMember { target: f.member }));
        assert!(admin.permits(GroupAction::RemoveMember { target: f.admin }));
        assert!(!outsider.permits(GroupAction::RemoveMember {
            target: f.outsider
        }));
    }

    #[test]
    fn member_only_views() {
        let f = fixture();
        let member = ctx(&f, Identity::user(f.member));
        assert!(member.permits(GroupAction::ViewGroup));
        assert!(!member.permits(GroupAction::ManageActivities));
        assert!(!member.permits(GroupAction::ManageInvites));
        assert!(!member.permits(GroupAction::AddMember));
        assert!(!member.permits(GroupAction::AddContribution));
        assert!(!member.permits(GroupAction::UpdateContribution));
        assert!(member.permits(GroupAction::ViewContribution));

        let outsider = ctx(&f, Identity::user(f.outsider));
        assert!(!outsider.permits(GroupAction::ViewGroup));
        assert!(!outsider.permits(GroupAction::ViewContribution));
    }

    #[test]
    fn global_admin_override_is_limited_to_contributions() {
        let f = fixture();
        let global = ctx(&f, Identity::global_admin(f.outsider));
        assert!(global.permits(GroupAction::AddContribution));
        assert!(global.permits(GroupAction::UpdateContribution));
        assert!(global.permits(GroupAction::DeleteContribution));
        assert!(global.permits(GroupAction::ViewContribution));
        assert!(!global.permits(GroupAction::ViewGroup));
        assert!(!global.permits(GroupAction::ManageInvites));
        assert!(!global.permits(GroupAction::DeleteGroup));
    }

    #[test]
    fn denial_is_permission_denied() {
        let f = fixture();
        let member = ctx(&f, Identity::user(f.member));
        let err = member.authorize(GroupAction::DeleteGroup).unwrap_err();
        assert!(matches!(err, TrackemError::PermissionDenied));
        assert_eq!(err.to_string(), "Permission denied: insufficient role");
    }
}
