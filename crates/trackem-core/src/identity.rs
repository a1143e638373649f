//! The authenticated caller as seen by every service operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical identity produced by the identity resolver, whichever
/// credential scheme the request used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    /// System-wide administrator flag. Independent of any group role.
    pub is_global_admin: bool,
}

impl Identity {
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_global_admin: false,
        }
    }

    pub fn global_admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_global_admin: true,
        }
    }
}
