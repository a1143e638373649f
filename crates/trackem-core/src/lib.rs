//! TrackEm Core — shared domain types for group activity tracking.
//!
//! This crate provides:
//! - Domain models ([`models`])
//! - The error taxonomy returned by every operation ([`error`])
//! - The storage contract implemented by the database crate
//!   ([`repository::MembershipStore`])
//! - Group role derivation and permission decisions ([`authz`])
//! - Contribution summaries ([`aggregate`])
//!
//! Nothing in here performs I/O.

pub mod aggregate;
pub mod authz;
pub mod error;
pub mod identity;
pub mod models;
pub mod repository;

pub use error::{TrackemError, TrackemResult};
pub use identity::Identity;
