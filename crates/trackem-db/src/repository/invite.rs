//! Invite queries.

use chrono::{DateTime, Utc};
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use trackem_core::models::invite::Invite;
use uuid::Uuid;

use super::{SurrealMembershipStore, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct InviteRow {
    record_id: String,
    email: String,
    group_id: String,
    invited_by_id: String,
    is_admin: bool,
    token_hash: String,
    expires_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl InviteRow {
    fn try_into_invite(self) -> Result<Invite, DbError> {
        Ok(Invite {
            id: parse_uuid("invite", &self.record_id)?,
            email: self.email,
            group_id: parse_uuid("group", &self.group_id)?,
            invited_by_id: parse_uuid("inviter", &self.invited_by_id)?,
            is_admin: self.is_admin,
            token_hash: self.token_hash,
            expires_at: self.expires_at,
            accepted_at: self.accepted_at,
            created_at: self.created_at,
        })
    }
}

fn single(rows: Vec<InviteRow>) -> Result<Option<Invite>, DbError> {
    rows.into_iter()
        .next()
        .map(InviteRow::try_into_invite)
        .transpose()
}

impl<C: Connection> SurrealMembershipStore<C> {
    pub(super) async fn insert_invite(&self, invite: Invite) -> Result<Invite, DbError> {
        self.db
            .query(
                "CREATE type::record('invite', $id) SET \
                 email = $email, group_id = $group_id, \
                 invited_by_id = $invited_by_id, is_admin = $is_admin, \
                 token_hash = $token_hash, expires_at = $expires_at, \
                 accepted_at = $accepted_at, created_at = $created_at",
            )
            .bind(("id", invite.id.to_string()))
            .bind(("email", invite.email.clone()))
            .bind(("group_id", invite.group_id.to_string()))
            .bind(("invited_by_id", invite.invited_by_id.to_string()))
            .bind(("is_admin", invite.is_admin))
            .bind(("token_hash", invite.token_hash.clone()))
            .bind(("expires_at", invite.expires_at))
            .bind(("accepted_at", invite.accepted_at))
            .bind(("created_at", invite.created_at))
            .await?
            .check()
            .map_err(|e| DbError::classify("invite", e.to_string()))?;

        Ok(invite)
    }

    pub(super) async fn fetch_invite(&self, id: Uuid) -> Result<Invite, DbError> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('invite', $id)")
            .bind(("id", id.to_string()))
            .await?;

        let rows: Vec<InviteRow> = result.take(0)?;
        single(rows)?.ok_or_else(|| DbError::not_found("invite", id))
    }

    pub(super) async fn fetch_invite_by_token(&self, token_hash: &str) -> Result<Invite, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM invite \
                 WHERE token_hash = $token_hash",
            )
            .bind(("token_hash", token_hash.to_string()))
            .await?;

        let rows: Vec<InviteRow> = result.take(0)?;
        // The hash is not echoed back; it is as good as the token.
        single(rows)?.ok_or_else(|| DbError::not_found("invite", "token"))
    }

    pub(super) async fn fetch_invite_for(
        &self,
        email: &str,
        group_id: Uuid,
    ) -> Result<Option<Invite>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM invite \
                 WHERE email = $email AND group_id = $group_id",
            )
            .bind(("email", email.to_string()))
            .bind(("group_id", group_id.to_string()))
            .await?;

        let rows: Vec<InviteRow> = result.take(0)?;
        single(rows)
    }

    pub(super) async fn fetch_pending_invites(
        &self,
        group_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Invite>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM invite \
                 WHERE group_id = $group_id \
                 AND accepted_at IS NONE \
                 AND expires_at > $now \
                 ORDER BY created_at DESC",
            )
            .bind(("group_id", group_id.to_string()))
            .bind(("now", now))
            .await?;

        let rows: Vec<InviteRow> = result.take(0)?;
        rows.into_iter().map(InviteRow::try_into_invite).collect()
    }

    pub(super) async fn remove_invite(&self, id: Uuid) -> Result<(), DbError> {
        self.db
            .query("DELETE type::record('invite', $id)")
            .bind(("id", id.to_string()))
            .await?;

        Ok(())
    }
}
