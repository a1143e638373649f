//! Domain models for TrackEm.
//!
//! These are the record types shared by the store, the services and
//! the aggregation engine.

pub mod activity;
pub mod contribution;
pub mod dashboard;
pub mod group;
pub mod invite;
pub mod membership;
pub mod user;
