//! Contribution queries.
//!
//! Contributions carry only their activity id; group-scoped reads go
//! through a subquery on `activity` so that one statement returns the
//! whole set. Every scope is ordered by date, oldest first.

use chrono::{DateTime, Utc};
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use trackem_core::models::contribution::{Contribution, ContributionScope, ContributionType};
use uuid::Uuid;

use super::{SurrealMembershipStore, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ContributionRow {
    record_id: String,
    user_id: String,
    activity_id: String,
    contribution_type: String,
    amount: f64,
    currency: Option<String>,
    description: String,
    date: DateTime<Utc>,
}

fn parse_type(s: &str) -> Result<ContributionType, DbError> {
    match s {
        "Money" => Ok(ContributionType::Money),
        "Time" => Ok(ContributionType::Time),
        other => Err(DbError::Decode(format!("unknown contribution type: {other}"))),
    }
}

fn type_to_string(t: ContributionType) -> &'static str {
    match t {
        ContributionType::Money => "Money",
        ContributionType::Time => "Time",
    }
}

impl ContributionRow {
    fn try_into_contribution(self) -> Result<Contribution, DbError> {
        Ok(Contribution {
            id: parse_uuid("contribution", &self.record_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            activity_id: parse_uuid("activity", &self.activity_id)?,
            contribution_type: parse_type(&self.contribution_type)?,
            amount: self.amount,
            currency: self.currency,
            description: self.description,
            date: self.date,
        })
    }
}

impl<C: Connection> SurrealMembershipStore<C> {
    pub(super) async fn insert_contribution(
        &self,
        contribution: Contribution,
    ) -> Result<Contribution, DbError> {
        self.db
            .query(
                "CREATE type::record('contribution', $id) SET \
                 user_id = $user_id, activity_id = $activity_id, \
                 contribution_type = $contribution_type, \
                 amount = $amount, currency = $currency, \
                 description = $description, date = $date",
            )
            .bind(("id", contribution.id.to_string()))
            .bind(("user_id", contribution.user_id.to_string()))
            .bind(("activity_id", contribution.activity_id.to_string()))
            .bind((
                "contribution_type",
                type_to_string(contribution.contribution_type),
            ))
            .bind(("amount", contribution.amount))
            .bind(("currency", contribution.currency.clone()))
            .bind(("description", contribution.description.clone()))
            .bind(("date", contribution.date))
            .await?
            .check()
            .map_err(|e| DbError::classify("contribution", e.to_string()))?;

        Ok(contribution)
    }

    pub(super) async fn fetch_contribution(&self, id: Uuid) -> Result<Contribution, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('contribution', $id)",
            )
            .bind(("id", id.to_string()))
            .await?;

        let rows: Vec<ContributionRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("contribution", id))?
            .try_into_contribution()
    }

    pub(super) async fn modify_contribution(
        &self,
        contribution: Contribution,
    ) -> Result<Contribution, DbError> {
        self.db
            .query(
                "UPDATE type::record('contribution', $id) SET \
                 contribution_type = $contribution_type, amount = $amount, \
                 currency = $currency, description = $description",
            )
            .bind(("id", contribution.id.to_string()))
            .bind((
                "contribution_type",
                type_to_string(contribution.contribution_type),
            ))
            .bind(("amount", contribution.amount))
            .bind(("currency", contribution.currency))
            .bind(("description", contribution.description))
            .await?
            .check()
            .map_err(|e| DbError::classify("contribution", e.to_string()))?;

        self.fetch_contribution(contribution.id).await
    }

    pub(super) async fn remove_contribution(&self, id: Uuid) -> Result<(), DbError> {
        self.db
            .query("DELETE type::record('contribution', $id)")
            .bind(("id", id.to_string()))
            .await?;

        Ok(())
    }

    pub(super) async fn fetch_contributions(
        &self,
        scope: ContributionScope,
    ) -> Result<Vec<Contribution>, DbError> {
        let mut result = match scope {
            ContributionScope::Activity(activity_id) => {
                self.db
                    .query(
                        "SELECT meta::id(id) AS record_id, * FROM contribution \
                         WHERE activity_id = $activity_id ORDER BY date ASC",
                    )
                    .bind(("activity_id", activity_id.to_string()))
                    .await?
            }
            ContributionScope::Group(group_id) => {
                self.db
                    .query(
                        "SELECT meta::id(id) AS record_id, * FROM contribution \
                         WHERE activity_id IN (\
                             SELECT VALUE meta::id(id) FROM activity \
                             WHERE group_id = $group_id\
                         ) \
                         ORDER BY date ASC",
                    )
                    .bind(("group_id", group_id.to_string()))
                    .await?
            }
            ContributionScope::User(user_id) => {
                self.db
                    .query(
                        "SELECT meta::id(id) AS record_id, * FROM contribution \
                         WHERE user_id = $user_id ORDER BY date ASC",
                    )
                    .bind(("user_id", user_id.to_string()))
                    .await?
            }
        };

        let rows: Vec<ContributionRow> = result.take(0)?;
        rows.into_iter()
            .map(ContributionRow::try_into_contribution)
            .collect()
    }
}
