//! Group queries. Groups are created and deleted through write batches
//! (see `transaction.rs`) so that the owner's membership and the
//! cascade travel with them.

use chrono::{DateTime, Utc};
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use trackem_core::models::group::{Group, GroupListing};
use uuid::Uuid;

use super::{CountRow, SurrealMembershipStore, first_count, parse_uuid};
use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct GroupRow {
    record_id: String,
    name: String,
    description: String,
    owner_id: String,
    created_at: DateTime<Utc>,
}

impl GroupRow {
    fn try_into_group(self) -> Result<Group, DbError> {
        Ok(Group {
            id: parse_uuid("group", &self.record_id)?,
            name: self.name,
            description: self.description,
            owner_id: parse_uuid("owner", &self.owner_id)?,
            created_at: self.created_at,
        })
    }
}

impl<C: Connection> SurrealMembershipStore<C> {
    pub(super) async fn fetch_group(&self, id: Uuid) -> Result<Group, DbError> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('group', $id)")
            .bind(("id", id.to_string()))
            .await?;

        let rows: Vec<GroupRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("group", id))?
            .try_into_group()
    }

    pub(super) async fn fetch_user_groups(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<GroupListing>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM group \
                 WHERE id IN (\
                     SELECT VALUE out FROM member_of \
                     WHERE in = type::record('user', $user_id)\
                 ) \
                 ORDER BY created_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await?;

        let rows: Vec<GroupRow> = result.take(0)?;

        let mut listings = Vec::with_capacity(rows.len());
        for row in rows {
            let group = row.try_into_group()?;
            let (member_count, activity_count) = self.count_group_children(group.id).await?;
            let is_admin = self
                .fetch_membership(user_id, group.id)
                .await?
                .is_some_and(|m| m.is_admin);
            listings.push(GroupListing {
                group,
                member_count,
                activity_count,
                is_admin,
            });
        }
        Ok(listings)
    }

    async fn count_group_children(&self, group_id: Uuid) -> Result<(u64, u64), DbError> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM member_of \
                 WHERE out = type::record('group', $group_id) GROUP ALL; \
                 SELECT count() AS total FROM activity \
                 WHERE group_id = $group_id GROUP ALL;",
            )
            .bind(("group_id", group_id.to_string()))
            .await?;

        let members: Vec<CountRow> = result.take(0)?;
        let activities: Vec<CountRow> = result.take(1)?;
        Ok((first_count(&members), first_count(&activities)))
    }
}
