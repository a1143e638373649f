//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. The unique indexes here
//! are what serialise racing membership and invite writes.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (read by the group core, owned by the identity subsystem)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD email_verified ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD is_global_admin ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Groups
-- =======================================================================
DEFINE TABLE group SCHEMAFULL;
DEFINE FIELD name ON TABLE group TYPE string;
DEFINE FIELD description ON TABLE group TYPE string;
DEFINE FIELD owner_id ON TABLE group TYPE string;
DEFINE FIELD created_at ON TABLE group TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_group_owner ON TABLE group COLUMNS owner_id;

-- =======================================================================
-- Invites (one row per email and group, whatever its state)
-- =======================================================================
DEFINE TABLE invite SCHEMAFULL;
DEFINE FIELD email ON TABLE invite TYPE string;
DEFINE FIELD group_id ON TABLE invite TYPE string;
DEFINE FIELD invited_by_id ON TABLE invite TYPE string;
DEFINE FIELD is_admin ON TABLE invite TYPE bool DEFAULT false;
DEFINE FIELD token_hash ON TABLE invite TYPE string;
DEFINE FIELD expires_at ON TABLE invite TYPE datetime;
DEFINE FIELD accepted_at ON TABLE invite TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE invite TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_invite_email_group ON TABLE invite \
    COLUMNS email, group_id UNIQUE;
DEFINE INDEX idx_invite_token ON TABLE invite COLUMNS token_hash UNIQUE;

-- =======================================================================
-- Activities
-- =======================================================================
DEFINE TABLE activity SCHEMAFULL;
DEFINE FIELD group_id ON TABLE activity TYPE string;
DEFINE FIELD name ON TABLE activity TYPE string;
DEFINE FIELD description ON TABLE activity TYPE string;
DEFINE FIELD created_at ON TABLE activity TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_activity_group ON TABLE activity COLUMNS group_id;

-- =======================================================================
-- Contributions
-- =======================================================================
DEFINE TABLE contribution SCHEMAFULL;
DEFINE FIELD user_id ON TABLE contribution TYPE string;
DEFINE FIELD activity_id ON TABLE contribution TYPE string;
DEFINE FIELD contribution_type ON TABLE contribution TYPE string \
    ASSERT $value IN ['Money', 'Time'];
DEFINE FIELD amount ON TABLE contribution TYPE number \
    ASSERT $value > 0;
DEFINE FIELD currency ON TABLE contribution TYPE option<string>;
DEFINE FIELD description ON TABLE contribution TYPE string;
DEFINE FIELD date ON TABLE contribution TYPE datetime;
DEFINE INDEX idx_contribution_activity ON TABLE contribution \
    COLUMNS activity_id;
DEFINE INDEX idx_contribution_user ON TABLE contribution COLUMNS user_id;

-- =======================================================================
-- Graph Edge Tables (relations)
-- =======================================================================

-- User -> Group membership, unique per pair
DEFINE TABLE member_of TYPE RELATION FROM user TO group SCHEMAFULL;
DEFINE FIELD is_admin ON TABLE member_of TYPE bool DEFAULT false;
DEFINE FIELD joined_at ON TABLE member_of TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_member_of_pair ON TABLE member_of \
    COLUMNS in, out UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// The `_migration` table is created on first run; every migration
/// whose version exceeds the highest recorded one is then applied and
/// recorded, in order.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let applied = current_version(db).await?;
    let pending = MIGRATIONS.iter().filter(|m| m.version > applied);

    for migration in pending {
        apply(db, migration).await?;
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

async fn current_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    Ok(records.first().map(|m| m.version).unwrap_or(0))
}

async fn apply<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    info!(
        version = migration.version,
        name = migration.name,
        "Applying migration"
    );

    db.query(migration.sql).await?.check().map_err(|e| {
        DbError::Migration(format!(
            "v{} '{}' failed: {e}",
            migration.version, migration.name
        ))
    })?;

    db.query("CREATE _migration SET version = $version, name = $name")
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!(
                "could not record v{}: {e}",
                migration.version
            ))
        })?;

    info!(version = migration.version, "Migration applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn race_guarding_indexes_are_unique() {
        for index in [
            "idx_member_of_pair",
            "idx_invite_email_group",
            "idx_invite_token",
            "idx_user_email",
        ] {
            let line = SCHEMA_V1
                .lines()
                .position(|l| l.contains(index))
                .unwrap_or_else(|| panic!("{index} missing"));
            let definition: String = SCHEMA_V1
                .lines()
                .skip(line)
                .take(2)
                .collect::<Vec<_>>()
                .join(" ");
            assert!(definition.contains("UNIQUE"), "{index} must be UNIQUE");
        }
    }

    #[test]
    fn contribution_type_matches_model_variants() {
        assert!(SCHEMA_V1.contains("ASSERT $value IN ['Money', 'Time']"));
    }
}
