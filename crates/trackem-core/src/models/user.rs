//! User domain model.
//!
//! Users are owned by the identity subsystem; the group core only reads
//! them (and creates them when seeding).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Unique across all users.
    pub email: String,
    pub email_verified: bool,
    pub is_global_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub email_verified: bool,
    pub is_global_admin: bool,
}
