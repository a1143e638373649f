//! Atomic write batches.
//!
//! A batch of [`WriteStep`]s is rendered into a single
//! `BEGIN TRANSACTION; ... COMMIT TRANSACTION;` query. Parameters are
//! namespaced per step (`$s0_id`, `$s1_id`, ...) so that steps of the
//! same kind can share a batch.

use surrealdb::Connection;
use trackem_core::repository::WriteStep;
use tracing::debug;

use super::SurrealMembershipStore;
use crate::error::{DbError, NOT_PENDING};

fn entity_of(step: &WriteStep) -> &'static str {
    match step {
        WriteStep::CreateGroup(_) | WriteStep::DeleteGroup(_) => "group",
        WriteStep::CreateMembership(_)
        | WriteStep::SetMembershipAdmin { .. }
        | WriteStep::DeleteMembership { .. }
        | WriteStep::DeleteMembershipsOfGroup(_) => "membership",
        WriteStep::CreateInvite(_)
        | WriteStep::MarkInviteAccepted { .. }
        | WriteStep::CancelInvite { .. }
        | WriteStep::DeleteInvite(_)
        | WriteStep::DeleteInvitesOfGroup(_) => "invite",
        WriteStep::DeleteContributionsOfActivity(_) | WriteStep::DeleteContributionsOfGroup(_) => {
            "contribution"
        }
        WriteStep::DeleteActivity(_) | WriteStep::DeleteActivitiesOfGroup(_) => "activity",
    }
}

/// Abort the transaction when the guarded statement of step `i`
/// touched no record.
fn guard(i: usize) -> String {
    format!("IF array::len($s{i}_hit) = 0 {{ THROW \"{NOT_PENDING}\"; }};")
}

fn statement(i: usize, step: &WriteStep) -> String {
    match step {
        WriteStep::CreateGroup(_) => format!(
            "CREATE type::record('group', $s{i}_id) SET \
             name = $s{i}_name, description = $s{i}_description, \
             owner_id = $s{i}_owner_id, created_at = $s{i}_created_at;"
        ),
        WriteStep::CreateMembership(m) => format!(
            "RELATE user:`{}` -> member_of -> group:`{}` \
             SET is_admin = $s{i}_is_admin, joined_at = $s{i}_joined_at;",
            m.user_id, m.group_id
        ),
        WriteStep::SetMembershipAdmin { .. } => format!(
            "UPDATE member_of SET is_admin = $s{i}_is_admin \
             WHERE in = type::record('user', $s{i}_user_id) \
             AND out = type::record('group', $s{i}_group_id);"
        ),
        WriteStep::DeleteMembership { .. } => format!(
            "DELETE member_of WHERE in = type::record('user', $s{i}_user_id) \
             AND out = type::record('group', $s{i}_group_id);"
        ),
        WriteStep::CreateInvite(_) => format!(
            "CREATE type::record('invite', $s{i}_id) SET \
             email = $s{i}_email, group_id = $s{i}_group_id, \
             invited_by_id = $s{i}_invited_by_id, is_admin = $s{i}_is_admin, \
             token_hash = $s{i}_token_hash, expires_at = $s{i}_expires_at, \
             accepted_at = NONE, created_at = $s{i}_created_at;"
        ),
        WriteStep::MarkInviteAccepted { .. } => format!(
            "LET $s{i}_hit = (UPDATE type::record('invite', $s{i}_id) \
             SET accepted_at = $s{i}_accepted_at \
             WHERE accepted_at IS NONE AND expires_at > $s{i}_accepted_at \
             RETURN AFTER);\n{}",
            guard(i)
        ),
        WriteStep::CancelInvite { .. } => format!(
            "LET $s{i}_hit = (DELETE type::record('invite', $s{i}_id) \
             WHERE accepted_at IS NONE AND expires_at > $s{i}_at \
             RETURN BEFORE);\n{}",
            guard(i)
        ),
        WriteStep::DeleteInvite(_) => format!("DELETE type::record('invite', $s{i}_id);"),
        WriteStep::DeleteContributionsOfActivity(_) => {
            format!("DELETE contribution WHERE activity_id = $s{i}_id;")
        }
        WriteStep::DeleteActivity(_) => format!("DELETE type::record('activity', $s{i}_id);"),
        WriteStep::DeleteContributionsOfGroup(_) => format!(
            "DELETE contribution WHERE activity_id IN (\
                 SELECT VALUE meta::id(id) FROM activity WHERE group_id = $s{i}_id\
             );"
        ),
        WriteStep::DeleteActivitiesOfGroup(_) => {
            format!("DELETE activity WHERE group_id = $s{i}_id;")
        }
        WriteStep::DeleteMembershipsOfGroup(_) => {
            format!("DELETE member_of WHERE out = type::record('group', $s{i}_id);")
        }
        WriteStep::DeleteInvitesOfGroup(_) => {
            format!("DELETE invite WHERE group_id = $s{i}_id;")
        }
        WriteStep::DeleteGroup(_) => format!("DELETE type::record('group', $s{i}_id);"),
    }
}

impl<C: Connection> SurrealMembershipStore<C> {
    pub(super) async fn apply_batch(&self, steps: Vec<WriteStep>) -> Result<(), DbError> {
        let Some(first) = steps.first() else {
            return Ok(());
        };
        let entity = entity_of(first);

        let mut sql = String::from("BEGIN TRANSACTION;\n");
        for (i, step) in steps.iter().enumerate() {
            sql.push_str(&statement(i, step));
            sql.push('\n');
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut query = self.db.query(sql);
        for (i, step) in steps.into_iter().enumerate() {
            let p = |name: &str| format!("s{i}_{name}");
            query = match step {
                WriteStep::CreateGroup(g) => query
                    .bind((p("id"), g.id.to_string()))
                    .bind((p("name"), g.name))
                    .bind((p("description"), g.description))
                    .bind((p("owner_id"), g.owner_id.to_string()))
                    .bind((p("created_at"), g.created_at)),
                WriteStep::CreateMembership(m) => query
                    .bind((p("is_admin"), m.is_admin))
                    .bind((p("joined_at"), m.joined_at)),
                WriteStep::SetMembershipAdmin {
                    user_id,
                    group_id,
                    is_admin,
                } => query
                    .bind((p("is_admin"), is_admin))
                    .bind((p("user_id"), user_id.to_string()))
                    .bind((p("group_id"), group_id.to_string())),
                WriteStep::DeleteMembership { user_id, group_id } => query
                    .bind((p("user_id"), user_id.to_string()))
                    .bind((p("group_id"), group_id.to_string())),
                WriteStep::CreateInvite(inv) => query
                    .bind((p("id"), inv.id.to_string()))
                    .bind((p("email"), inv.email))
                    .bind((p("group_id"), inv.group_id.to_string()))
                    .bind((p("invited_by_id"), inv.invited_by_id.to_string()))
                    .bind((p("is_admin"), inv.is_admin))
                    .bind((p("token_hash"), inv.token_hash))
                    .bind((p("expires_at"), inv.expires_at))
                    .bind((p("created_at"), inv.created_at)),
                WriteStep::MarkInviteAccepted {
                    invite_id,
                    accepted_at,
                } => query
                    .bind((p("id"), invite_id.to_string()))
                    .bind((p("accepted_at"), accepted_at)),
                WriteStep::CancelInvite { invite_id, at } => query
                    .bind((p("id"), invite_id.to_string()))
                    .bind((p("at"), at)),
                WriteStep::DeleteInvite(id)
                | WriteStep::DeleteContributionsOfActivity(id)
                | WriteStep::DeleteActivity(id)
                | WriteStep::DeleteContributionsOfGroup(id)
                | WriteStep::DeleteActivitiesOfGroup(id)
                | WriteStep::DeleteMembershipsOfGroup(id)
                | WriteStep::DeleteInvitesOfGroup(id)
                | WriteStep::DeleteGroup(id) => query.bind((p("id"), id.to_string())),
            };
        }

        let mut response = query.await?;
        let errors = response.take_errors();
        if errors.is_empty() {
            return Ok(());
        }

        // Every statement of a failed transaction reports an error; the
        // one that caused the rollback is somewhere among them.
        let mut messages: Vec<(usize, String)> = errors
            .into_iter()
            .map(|(idx, e)| (idx, e.to_string()))
            .collect();
        messages.sort_by_key(|(idx, _)| *idx);
        let joined = messages
            .into_iter()
            .map(|(_, m)| m)
            .collect::<Vec<_>>()
            .join("; ");

        debug!(entity, error = %joined, "write batch rolled back");
        Err(DbError::classify(entity, joined))
    }
}
