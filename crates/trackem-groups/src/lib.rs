//! TrackEm Groups — the operations callers perform on groups:
//! membership management, the invitation lifecycle, and activities
//! with their contribution summaries.
//!
//! Every service is generic over [`MembershipStore`] so this crate has
//! no dependency on the database crate.
//!
//! [`MembershipStore`]: trackem_core::repository::MembershipStore

mod access;
pub mod activity;
pub mod config;
pub mod email;
pub mod invitation;
pub mod membership;

pub use activity::ActivityService;
pub use config::GroupsConfig;
pub use email::{EmailError, EmailSender, InviteEmail, LogEmailSender};
pub use invitation::InvitationService;
pub use membership::MembershipService;
