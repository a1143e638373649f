//! Membership queries over the `member_of` edge (user -> group).

use chrono::{DateTime, Utc};
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use trackem_core::models::membership::Membership;
use uuid::Uuid;

use super::{SurrealMembershipStore, parse_uuid};
use crate::error::DbError;

/// Edge row with both endpoints projected to their UUID strings.
#[derive(Debug, SurrealValue)]
struct MembershipRow {
    user_id: String,
    group_id: String,
    is_admin: bool,
    joined_at: DateTime<Utc>,
}

impl MembershipRow {
    fn try_into_membership(self) -> Result<Membership, DbError> {
        Ok(Membership {
            user_id: parse_uuid("user", &self.user_id)?,
            group_id: parse_uuid("group", &self.group_id)?,
            is_admin: self.is_admin,
            joined_at: self.joined_at,
        })
    }
}

const SELECT_EDGE: &str = "SELECT meta::id(in) AS user_id, meta::id(out) AS group_id, \
     is_admin, joined_at FROM member_of";

impl<C: Connection> SurrealMembershipStore<C> {
    pub(super) async fn fetch_membership(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> Result<Option<Membership>, DbError> {
        let query = format!(
            "{SELECT_EDGE} WHERE in = type::record('user', $user_id) \
             AND out = type::record('group', $group_id)"
        );
        let mut result = self
            .db
            .query(query)
            .bind(("user_id", user_id.to_string()))
            .bind(("group_id", group_id.to_string()))
            .await?;

        let rows: Vec<MembershipRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(MembershipRow::try_into_membership)
            .transpose()
    }

    pub(super) async fn fetch_memberships(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<Membership>, DbError> {
        let query = format!(
            "{SELECT_EDGE} WHERE out = type::record('group', $group_id) \
             ORDER BY joined_at ASC"
        );
        let mut result = self
            .db
            .query(query)
            .bind(("group_id", group_id.to_string()))
            .await?;

        let rows: Vec<MembershipRow> = result.take(0)?;
        rows.into_iter()
            .map(MembershipRow::try_into_membership)
            .collect()
    }

    pub(super) async fn relate_membership(
        &self,
        membership: Membership,
    ) -> Result<Membership, DbError> {
        // The unique index on (in, out) rejects a second edge.
        let query = format!(
            "RELATE user:`{}` -> member_of -> group:`{}` \
             SET is_admin = $is_admin, joined_at = $joined_at;",
            membership.user_id, membership.group_id
        );

        self.db
            .query(query)
            .bind(("is_admin", membership.is_admin))
            .bind(("joined_at", membership.joined_at))
            .await?
            .check()
            .map_err(|e| DbError::classify("membership", e.to_string()))?;

        Ok(membership)
    }

    pub(super) async fn set_membership_admin(
        &self,
        user_id: Uuid,
        group_id: Uuid,
        is_admin: bool,
    ) -> Result<Membership, DbError> {
        self.db
            .query(
                "UPDATE member_of SET is_admin = $is_admin \
                 WHERE in = type::record('user', $user_id) \
                 AND out = type::record('group', $group_id)",
            )
            .bind(("is_admin", is_admin))
            .bind(("user_id", user_id.to_string()))
            .bind(("group_id", group_id.to_string()))
            .await?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        self.fetch_membership(user_id, group_id)
            .await?
            .ok_or_else(|| DbError::not_found("membership", format!("{user_id}/{group_id}")))
    }

    pub(super) async fn remove_membership(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> Result<(), DbError> {
        self.db
            .query(
                "DELETE member_of WHERE \
                 in = type::record('user', $user_id) AND \
                 out = type::record('group', $group_id)",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("group_id", group_id.to_string()))
            .await?;

        Ok(())
    }
}
