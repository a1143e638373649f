//! TrackEm Database — SurrealDB connection management and the
//! [`MembershipStore`](trackem_core::repository::MembershipStore)
//! implementation.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - The store itself ([`repository::SurrealMembershipStore`])
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::SurrealMembershipStore;
pub use schema::{run_migrations, schema_v1};
