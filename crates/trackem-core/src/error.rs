//! Error types for the TrackEm system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackemError {
    #[error("Authentication required")]
    Unauthenticated,

    /// Deliberately carries no detail so that non-members learn nothing
    /// about a group's membership.
    #[error("Permission denied: insufficient role")]
    PermissionDenied,

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    #[error("Expired: {entity}")]
    Expired { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Raised by the store when a unique index rejects a write.
    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrackemError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

pub type TrackemResult<T> = Result<T, TrackemError>;
