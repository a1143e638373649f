//! User queries.

use chrono::{DateTime, Utc};
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use trackem_core::models::user::{CreateUser, User};
use uuid::Uuid;

use super::{SurrealMembershipStore, parse_uuid};
use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    username: String,
    email: String,
    email_verified: bool,
    is_global_admin: bool,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: parse_uuid("user", &self.record_id)?,
            username: self.username,
            email: self.email,
            email_verified: self.email_verified,
            is_global_admin: self.is_global_admin,
            created_at: self.created_at,
        })
    }
}

impl<C: Connection> SurrealMembershipStore<C> {
    pub(super) async fn insert_user(&self, input: CreateUser) -> Result<User, DbError> {
        let user = User {
            id: Uuid::new_v4(),
            username: input.username,
            email: input.email.trim().to_lowercase(),
            email_verified: input.email_verified,
            is_global_admin: input.is_global_admin,
            created_at: Utc::now(),
        };

        self.db
            .query(
                "CREATE type::record('user', $id) SET \
                 username = $username, email = $email, \
                 email_verified = $email_verified, \
                 is_global_admin = $is_global_admin, \
                 created_at = $created_at",
            )
            .bind(("id", user.id.to_string()))
            .bind(("username", user.username.clone()))
            .bind(("email", user.email.clone()))
            .bind(("email_verified", user.email_verified))
            .bind(("is_global_admin", user.is_global_admin))
            .bind(("created_at", user.created_at))
            .await?
            .check()
            .map_err(|e| DbError::classify("user", e.to_string()))?;

        Ok(user)
    }

    pub(super) async fn fetch_user(&self, id: Uuid) -> Result<User, DbError> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('user', $id)")
            .bind(("id", id.to_string()))
            .await?;

        let rows: Vec<UserRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", id))?
            .try_into_user()
    }

    pub(super) async fn fetch_user_by_email(&self, email: &str) -> Result<User, DbError> {
        let email = email.trim().to_lowercase();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM user WHERE email = $email")
            .bind(("email", email.clone()))
            .await?;

        let rows: Vec<UserRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", format!("email={email}")))?
            .try_into_user()
    }
}
