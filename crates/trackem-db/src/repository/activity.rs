//! Activity queries.

use chrono::{DateTime, Utc};
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use trackem_core::models::activity::Activity;
use uuid::Uuid;

use super::{SurrealMembershipStore, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ActivityRow {
    record_id: String,
    group_id: String,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl ActivityRow {
    fn try_into_activity(self) -> Result<Activity, DbError> {
        Ok(Activity {
            id: parse_uuid("activity", &self.record_id)?,
            group_id: parse_uuid("group", &self.group_id)?,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
        })
    }
}

impl<C: Connection> SurrealMembershipStore<C> {
    pub(super) async fn insert_activity(&self, activity: Activity) -> Result<Activity, DbError> {
        self.db
            .query(
                "CREATE type::record('activity', $id) SET \
                 group_id = $group_id, name = $name, \
                 description = $description, created_at = $created_at",
            )
            .bind(("id", activity.id.to_string()))
            .bind(("group_id", activity.group_id.to_string()))
            .bind(("name", activity.name.clone()))
            .bind(("description", activity.description.clone()))
            .bind(("created_at", activity.created_at))
            .await?
            .check()
            .map_err(|e| DbError::classify("activity", e.to_string()))?;

        Ok(activity)
    }

    pub(super) async fn fetch_activity(&self, id: Uuid) -> Result<Activity, DbError> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('activity', $id)")
            .bind(("id", id.to_string()))
            .await?;

        let rows: Vec<ActivityRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("activity", id))?
            .try_into_activity()
    }

    pub(super) async fn fetch_activities(&self, group_id: Uuid) -> Result<Vec<Activity>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM activity \
                 WHERE group_id = $group_id ORDER BY created_at ASC",
            )
            .bind(("group_id", group_id.to_string()))
            .await?;

        let rows: Vec<ActivityRow> = result.take(0)?;
        rows.into_iter().map(ActivityRow::try_into_activity).collect()
    }
}
