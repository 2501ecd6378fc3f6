use rusqlite::{Connection, params};
use serde::Serialize;

use crate::errors::AppError;

/// A stored collaboration invitation. The original system only emailed
/// these; here they are persisted so the per-proposal listing reflects
/// what was actually sent.
#[derive(Debug, Clone, Serialize)]
pub struct Invitation {
    pub id: i64,
    pub proposal_id: i64,
    pub email: String,
    pub invite_role: String,
    pub message: String,
    pub invited_by: String,
    pub status: String,
    pub created_at: String,
}

pub fn create(
    conn: &Connection,
    proposal_id: i64,
    email: &str,
    invite_role: &str,
    message: &str,
    invited_by: &str,
) -> Result<Invitation, AppError> {
    let created_at = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO invitations (proposal_id, email, invite_role, message, invited_by, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![proposal_id, email, invite_role, message, invited_by, created_at],
    )?;
    Ok(Invitation {
        id: conn.last_insert_rowid(),
        proposal_id,
        email: email.to_string(),
        invite_role: invite_role.to_string(),
        message: message.to_string(),
        invited_by: invited_by.to_string(),
        status: "pending".to_string(),
        created_at,
    })
}

pub fn find_for_proposal(conn: &Connection, proposal_id: i64) -> Result<Vec<Invitation>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, proposal_id, email, invite_role, message, invited_by, status, created_at \
         FROM invitations WHERE proposal_id = ?1 ORDER BY id",
    )?;
    let items = stmt
        .query_map(params![proposal_id], |row| {
            Ok(Invitation {
                id: row.get("id")?,
                proposal_id: row.get("proposal_id")?,
                email: row.get("email")?,
                invite_role: row.get("invite_role")?,
                message: row.get("message")?,
                invited_by: row.get("invited_by")?,
                status: row.get("status")?,
                created_at: row.get("created_at")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}
