//! Database-specific error types and conversions.

use trackem_core::error::TrackemError;

/// Message thrown by a guarded invite step whose invite is gone,
/// accepted or expired.
pub(crate) const NOT_PENDING: &str = "invite is no longer pending";

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Unique index violated on {entity}")]
    UniqueViolation { entity: String },

    #[error("Transaction conflict on {entity}")]
    TransactionConflict { entity: String },

    #[error("Precondition failed on {entity}: {reason}")]
    Precondition { entity: String, reason: String },

    #[error("Invalid row: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    /// Sort a statement error into a failed guard, a uniqueness
    /// violation, a transaction conflict, or a plain query failure.
    pub(crate) fn classify(entity: &str, message: String) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains(NOT_PENDING) {
            DbError::Precondition {
                entity: entity.into(),
                reason: NOT_PENDING.into(),
            }
        } else if lower.contains("already contains") {
            DbError::UniqueViolation {
                entity: entity.into(),
            }
        } else if lower.contains("conflict") {
            DbError::TransactionConflict {
                entity: entity.into(),
            }
        } else {
            DbError::Query(message)
        }
    }

    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<DbError> for TrackemError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TrackemError::NotFound { entity, id },
            DbError::UniqueViolation { entity } | DbError::TransactionConflict { entity } => {
                TrackemError::AlreadyExists { entity }
            }
            DbError::Precondition { reason, .. } => TrackemError::Conflict { reason },
            other => TrackemError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_index_messages_become_already_exists() {
        let err = DbError::classify(
            "member_of",
            "Database index `idx_member_of_pair` already contains [user:a, group:b]".into(),
        );
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert!(matches!(
            TrackemError::from(err),
            TrackemError::AlreadyExists { .. }
        ));
    }

    #[test]
    fn commit_conflicts_become_already_exists() {
        let err = DbError::classify(
            "invite",
            "Failed to commit transaction due to a read or write conflict".into(),
        );
        assert!(matches!(
            TrackemError::from(err),
            TrackemError::AlreadyExists { .. }
        ));
    }

    #[test]
    fn failed_invite_guards_become_conflicts() {
        let err = DbError::classify(
            "invite",
            format!(
                "The query was not executed due to a failed transaction; \
                 An error occurred: {NOT_PENDING}"
            ),
        );
        assert!(matches!(err, DbError::Precondition { .. }));
        assert!(matches!(
            TrackemError::from(err),
            TrackemError::Conflict { .. }
        ));
    }

    #[test]
    fn other_failures_are_database_errors() {
        let err = DbError::classify("group", "Parse error".into());
        assert!(matches!(TrackemError::from(err), TrackemError::Database(_)));
    }
}
