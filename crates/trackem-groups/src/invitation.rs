//! Invitation lifecycle: create, cancel, accept, list and preview.
//!
//! An invite is `Pending` until it is accepted, expires, or is
//! cancelled (deleted). Terminal invites are never reopened; a fresh
//! invite for the same address replaces a terminal one.

use chrono::Utc;
use tracing::{info, warn};
use trackem_auth::token::{generate_opaque_token, hash_opaque_token};
use trackem_core::authz::GroupAction;
use trackem_core::error::{TrackemError, TrackemResult};
use trackem_core::models::invite::{
    AcceptedInvite, CreateInvite, CreatedInvite, Invite, InvitePreview, InviteState,
};
use trackem_core::models::membership::Membership;
use trackem_core::repository::{MembershipStore, WriteStep};
use trackem_core::Identity;
use uuid::Uuid;

use crate::access;
use crate::config::GroupsConfig;
use crate::email::{EmailSender, InviteEmail};

pub(crate) fn normalize_email(raw: &str) -> TrackemResult<String> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(TrackemError::validation("a valid email address is required")),
    }
}

/// Map the state of an invite that is not pending to its error.
fn not_pending(state: InviteState) -> TrackemResult<()> {
    match state {
        InviteState::Pending => Ok(()),
        InviteState::Accepted => Err(TrackemError::conflict("invite already accepted")),
        InviteState::Expired => Err(TrackemError::Expired {
            entity: "invite".into(),
        }),
    }
}

pub struct InvitationService<S: MembershipStore, E: EmailSender> {
    store: S,
    mailer: E,
    config: GroupsConfig,
}

impl<S: MembershipStore, E: EmailSender> InvitationService<S, E> {
    pub fn new(store: S, mailer: E, config: GroupsConfig) -> Self {
        Self {
            store,
            mailer,
            config,
        }
    }

    /// Explain why a guarded invite step failed: the invite was
    /// cancelled, accepted or expired after it was last read.
    async fn settled(&self, invite_id: Uuid, err: TrackemError) -> TrackemError {
        match err {
            TrackemError::Conflict { .. } | TrackemError::AlreadyExists { .. } => {
                match self.store.get_invite(invite_id).await {
                    Ok(invite) => match not_pending(invite.state_at(Utc::now())) {
                        Err(e) => e,
                        Ok(()) => TrackemError::conflict("invite changed concurrently"),
                    },
                    Err(e) => e,
                }
            }
            other => other,
        }
    }

    /// Invite an email address into a group. Requires Admin.
    ///
    /// Returns the stored invite together with the raw token, which is
    /// not recoverable afterwards. The invite email is sent after the
    /// invite is stored; a failed send is logged and ignored.
    pub async fn create(
        &self,
        caller: Identity,
        input: CreateInvite,
    ) -> TrackemResult<CreatedInvite> {
        let (group, ctx) = access::load(&self.store, caller, input.group_id).await?;
        ctx.authorize(GroupAction::ManageInvites)?;

        let email = normalize_email(&input.email)?;

        match self.store.get_user_by_email(&email).await {
            Ok(user) => {
                if self
                    .store
                    .get_membership(user.id, group.id)
                    .await?
                    .is_some()
                {
                    return Err(TrackemError::conflict("user is already a member"));
                }
            }
            Err(TrackemError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let now = Utc::now();
        let mut steps = Vec::with_capacity(2);
        if let Some(existing) = self.store.find_invite(&email, group.id).await? {
            if existing.is_pending_at(now) {
                return Err(TrackemError::conflict("a pending invite already exists"));
            }
            steps.push(WriteStep::DeleteInvite(existing.id));
        }

        let token = generate_opaque_token(self.config.invite_token_bytes);
        let invite = Invite {
            id: Uuid::new_v4(),
            email,
            group_id: group.id,
            invited_by_id: caller.user_id,
            is_admin: input.is_admin,
            token_hash: hash_opaque_token(&token),
            expires_at: now + self.config.invite_lifetime(),
            accepted_at: None,
            created_at: now,
        };
        steps.push(WriteStep::CreateInvite(invite.clone()));

        // A concurrent create for the same address loses on the
        // (email, group_id) index.
        self.store
            .run_transaction(steps)
            .await
            .map_err(|e| match e {
                TrackemError::AlreadyExists { .. } => {
                    TrackemError::conflict("a pending invite already exists")
                }
                other => other,
            })?;

        info!(
            invite_id = %invite.id,
            group_id = %group.id,
            invited_by = %caller.user_id,
            is_admin = invite.is_admin,
            "Invite created"
        );

        let inviter_name = match self.store.get_user(caller.user_id).await {
            Ok(user) => user.username,
            Err(e) => {
                warn!(
                    invite_id = %invite.id,
                    user_id = %caller.user_id,
                    error = %e,
                    "Inviter lookup failed; using generic name"
                );
                "A group admin".to_string()
            }
        };
        let message = InviteEmail {
            to: invite.email.clone(),
            group_name: group.name.clone(),
            inviter_name,
            accept_url: self.config.accept_url(&token),
            token: token.clone(),
            is_admin: invite.is_admin,
        };
        if let Err(e) = self.mailer.send_invite(&message).await {
            warn!(
                invite_id = %invite.id,
                error = %e,
                "Invite email failed; invite kept"
            );
        }

        Ok(CreatedInvite { invite, token })
    }

    /// Cancel a pending invite of `group_id`. Requires Admin.
    ///
    /// The delete is conditional on the invite still being pending, so an
    /// accept that commits first wins and the cancel reports `Conflict`.
    pub async fn cancel(
        &self,
        caller: Identity,
        group_id: Uuid,
        invite_id: Uuid,
    ) -> TrackemResult<()> {
        let (_, ctx) = access::load(&self.store, caller, group_id).await?;
        ctx.authorize(GroupAction::ManageInvites)?;

        let invite = self.store.get_invite(invite_id).await?;
        if invite.group_id != group_id {
            return Err(TrackemError::not_found("invite", invite_id));
        }
        let now = Utc::now();
        not_pending(invite.state_at(now))?;

        if let Err(e) = self
            .store
            .run_transaction(vec![WriteStep::CancelInvite { invite_id, at: now }])
            .await
        {
            return Err(self.settled(invite_id, e).await);
        }

        info!(invite_id = %invite_id, group_id = %group_id, "Invite cancelled");
        Ok(())
    }

    /// Accept an invite on behalf of the signed-in user.
    ///
    /// The caller's account email must match the invited address. The
    /// membership and the acceptance mark are written together, and the
    /// mark only applies while the invite is still pending. A concurrent
    /// accept surfaces as `Conflict`, a concurrent cancel as `NotFound`.
    pub async fn accept(&self, caller: Identity, token: &str) -> TrackemResult<AcceptedInvite> {
        let invite = self
            .store
            .get_invite_by_token(&hash_opaque_token(token))
            .await?;
        let now = Utc::now();
        not_pending(invite.state_at(now))?;

        let user = self.store.get_user(caller.user_id).await?;
        if user.email.to_lowercase() != invite.email {
            warn!(
                invite_id = %invite.id,
                user_id = %caller.user_id,
                "Invite accept denied: email mismatch"
            );
            return Err(TrackemError::PermissionDenied);
        }

        let group = self.store.get_group(invite.group_id).await?;
        let accepted = WriteStep::MarkInviteAccepted {
            invite_id: invite.id,
            accepted_at: now,
        };

        if self
            .store
            .get_membership(user.id, group.id)
            .await?
            .is_some()
        {
            if let Err(e) = self.store.run_transaction(vec![accepted]).await {
                return Err(self.settled(invite.id, e).await);
            }
            info!(invite_id = %invite.id, "Invite closed; user already a member");
            return Err(TrackemError::conflict("user is already a member"));
        }

        let membership = Membership {
            user_id: user.id,
            group_id: group.id,
            is_admin: invite.is_admin,
            joined_at: now,
        };
        if let Err(e) = self
            .store
            .run_transaction(vec![WriteStep::CreateMembership(membership), accepted])
            .await
        {
            return Err(self.settled(invite.id, e).await);
        }

        info!(
            invite_id = %invite.id,
            group_id = %group.id,
            user_id = %user.id,
            is_admin = invite.is_admin,
            "Invite accepted"
        );

        Ok(AcceptedInvite {
            group_id: group.id,
            group_name: group.name,
            is_admin: invite.is_admin,
        })
    }

    /// Pending invites of a group, newest first. Requires Admin.
    pub async fn list_pending(&self, caller: Identity, group_id: Uuid) -> TrackemResult<Vec<Invite>> {
        let (_, ctx) = access::load(&self.store, caller, group_id).await?;
        ctx.authorize(GroupAction::ManageInvites)?;

        self.store.list_pending_invites(group_id, Utc::now()).await
    }

    /// What an invite link points at. Needs no identity: holding the
    /// token is enough to see this much.
    pub async fn preview(&self, token: &str) -> TrackemResult<InvitePreview> {
        let invite = self
            .store
            .get_invite_by_token(&hash_opaque_token(token))
            .await?;
        not_pending(invite.state_at(Utc::now()))?;

        let group = self.store.get_group(invite.group_id).await?;
        let inviter = self.store.get_user(invite.invited_by_id).await?;
        let user_exists = match self.store.get_user_by_email(&invite.email).await {
            Ok(_) => true,
            Err(TrackemError::NotFound { .. }) => false,
            Err(e) => return Err(e),
        };

        Ok(InvitePreview {
            invite_id: invite.id,
            email: invite.email,
            group_id: group.id,
            group_name: group.name,
            inviter_name: inviter.username,
            is_admin: invite.is_admin,
            expires_at: invite.expires_at,
            user_exists,
        })
    }
}
