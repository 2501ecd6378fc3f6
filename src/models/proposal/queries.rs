use rusqlite::{Connection, OptionalExtension, params};

use super::types::{FeedbackEntry, Proposal, Status};
use crate::errors::AppError;
use crate::models::role::Role;

/// SQL for a full proposal row joined with its author's display name.
const SELECT_PROPOSAL: &str = "\
    SELECT p.id, p.title, p.description, p.domain, p.budget, p.status, \
           p.author_id, u.display_name AS author_name, p.assigned_staff, \
           p.reviewer, p.created_at, p.priority, p.deadline, \
           p.completion_percentage \
    FROM proposals p \
    JOIN users u ON u.id = p.author_id";

struct ProposalRow {
    id: i64,
    title: String,
    description: String,
    domain: String,
    budget: Option<i64>,
    status: String,
    author_id: i64,
    author_name: String,
    assigned_staff: Option<String>,
    reviewer: Option<String>,
    created_at: String,
    priority: Option<String>,
    deadline: Option<String>,
    completion_percentage: Option<i64>,
}

fn row_to_proposal_row(row: &rusqlite::Row) -> rusqlite::Result<ProposalRow> {
    Ok(ProposalRow {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        domain: row.get("domain")?,
        budget: row.get("budget")?,
        status: row.get("status")?,
        author_id: row.get("author_id")?,
        author_name: row.get("author_name")?,
        assigned_staff: row.get("assigned_staff")?,
        reviewer: row.get("reviewer")?,
        created_at: row.get("created_at")?,
        priority: row.get("priority")?,
        deadline: row.get("deadline")?,
        completion_percentage: row.get("completion_percentage")?,
    })
}

fn into_proposal(row: ProposalRow) -> Result<Proposal, AppError> {
    let status = Status::parse(&row.status)?;
    Ok(Proposal {
        id: row.id,
        title: row.title,
        description: row.description,
        domain: row.domain,
        budget: row.budget,
        status,
        author_id: row.author_id,
        author_name: row.author_name,
        assigned_staff: row.assigned_staff,
        reviewer: row.reviewer,
        created_at: row.created_at,
        priority: row.priority,
        deadline: row.deadline,
        completion_percentage: row.completion_percentage,
    })
}

/// Create a proposal authored by the given user. Returns the stored
/// record.
pub fn create(
    conn: &Connection,
    author_id: i64,
    title: &str,
    description: &str,
    domain: &str,
    budget: Option<i64>,
    initial_status: Status,
) -> Result<Proposal, AppError> {
    let created_at = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO proposals (title, description, domain, budget, status, author_id, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            title,
            description,
            domain,
            budget,
            initial_status.as_str(),
            author_id,
            created_at,
        ],
    )?;
    let id = conn.last_insert_rowid();
    find_by_id(conn, id)?.ok_or(AppError::NotFound)
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Proposal>, AppError> {
    let sql = format!("{SELECT_PROPOSAL} WHERE p.id = ?1");
    let row = conn
        .query_row(&sql, params![id], row_to_proposal_row)
        .optional()?;
    row.map(into_proposal).transpose()
}

/// List proposals visible to an actor. Visibility is decided here, at
/// the store boundary: applicants get their own, staff get the ones
/// assigned to them, reviewers get everything. Rows come back in store
/// order (id ascending), which is the tie-break order for sorting.
pub fn list_visible(
    conn: &Connection,
    role: Role,
    user_id: i64,
    display_name: &str,
) -> Result<Vec<Proposal>, AppError> {
    let (sql, param): (String, Option<rusqlite::types::Value>) = match role {
        Role::Applicant => (
            format!("{SELECT_PROPOSAL} WHERE p.author_id = ?1 ORDER BY p.id"),
            Some(rusqlite::types::Value::Integer(user_id)),
        ),
        Role::Staff => (
            format!("{SELECT_PROPOSAL} WHERE p.assigned_staff = ?1 ORDER BY p.id"),
            Some(rusqlite::types::Value::Text(display_name.to_string())),
        ),
        Role::Reviewer => (format!("{SELECT_PROPOSAL} ORDER BY p.id"), None),
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = match param {
        Some(p) => stmt.query_map(params![p], row_to_proposal_row)?,
        None => stmt.query_map([], row_to_proposal_row)?,
    }
    .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(into_proposal).collect()
}

/// Compare-and-set status update: only writes if the row still holds
/// `from`. A concurrent writer that got there first surfaces as
/// `Conflict`, so the caller re-fetches instead of clobbering.
pub fn update_status_cas(
    conn: &Connection,
    proposal_id: i64,
    from: Status,
    to: Status,
    reviewer: Option<&str>,
) -> Result<Proposal, AppError> {
    let changed = match reviewer {
        Some(name) => conn.execute(
            "UPDATE proposals SET status = ?1, reviewer = ?2 WHERE id = ?3 AND status = ?4",
            params![to.as_str(), name, proposal_id, from.as_str()],
        )?,
        None => conn.execute(
            "UPDATE proposals SET status = ?1 WHERE id = ?2 AND status = ?3",
            params![to.as_str(), proposal_id, from.as_str()],
        )?,
    };

    if changed == 0 {
        return match find_by_id(conn, proposal_id)? {
            Some(current) => Err(AppError::Conflict(format!(
                "Proposal status changed to '{}' while this request was in flight; \
                 re-fetch and retry",
                current.status
            ))),
            None => Err(AppError::NotFound),
        };
    }

    find_by_id(conn, proposal_id)?.ok_or(AppError::NotFound)
}

/// Assign a staff member to an approved proposal, moving it to
/// `assigned_to_staff` in the same write. The guard (status approved,
/// no staff yet) lives in the WHERE clause so two racing reviewers
/// cannot both win.
pub fn assign_staff_cas(
    conn: &Connection,
    proposal_id: i64,
    staff_name: &str,
    reviewer: &str,
) -> Result<Proposal, AppError> {
    let changed = conn.execute(
        "UPDATE proposals SET assigned_staff = ?1, status = ?2, reviewer = ?3 \
         WHERE id = ?4 AND status = ?5 AND assigned_staff IS NULL",
        params![
            staff_name,
            Status::AssignedToStaff.as_str(),
            reviewer,
            proposal_id,
            Status::Approved.as_str(),
        ],
    )?;

    if changed == 0 {
        let current = find_by_id(conn, proposal_id)?.ok_or(AppError::NotFound)?;
        let msg = if current.assigned_staff.is_some() {
            format!(
                "Proposal #{proposal_id} is already assigned to '{}'",
                current.assigned_staff.unwrap_or_default()
            )
        } else {
            format!(
                "Proposal #{proposal_id} must be approved before staff can be assigned \
                 (current status: '{}')",
                current.status
            )
        };
        return Err(AppError::PreconditionFailed(msg));
    }

    find_by_id(conn, proposal_id)?.ok_or(AppError::NotFound)
}

/// Update execution metadata on a proposal assigned to the given staff
/// member. Only touches columns the caller actually supplied.
pub fn update_progress(
    conn: &Connection,
    proposal_id: i64,
    staff_name: &str,
    priority: Option<&str>,
    deadline: Option<&str>,
    completion_percentage: Option<i64>,
) -> Result<Proposal, AppError> {
    let changed = conn.execute(
        "UPDATE proposals SET \
             priority = COALESCE(?1, priority), \
             deadline = COALESCE(?2, deadline), \
             completion_percentage = COALESCE(?3, completion_percentage) \
         WHERE id = ?4 AND assigned_staff = ?5",
        params![priority, deadline, completion_percentage, proposal_id, staff_name],
    )?;

    if changed == 0 {
        return match find_by_id(conn, proposal_id)? {
            Some(_) => Err(AppError::Forbidden(format!(
                "Proposal #{proposal_id} is not assigned to you"
            ))),
            None => Err(AppError::NotFound),
        };
    }

    find_by_id(conn, proposal_id)?.ok_or(AppError::NotFound)
}

/// Append a feedback entry. Feedback is never updated or deleted.
pub fn append_feedback(
    conn: &Connection,
    proposal_id: i64,
    reviewer_name: &str,
    body: &str,
) -> Result<FeedbackEntry, AppError> {
    let created_at = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO proposal_feedback (proposal_id, reviewer_name, body, created_at) \
         VALUES (?1, ?2, ?3, ?4)",
        params![proposal_id, reviewer_name, body, created_at],
    )?;
    Ok(FeedbackEntry {
        id: conn.last_insert_rowid(),
        proposal_id,
        reviewer_name: reviewer_name.to_string(),
        body: body.to_string(),
        created_at,
    })
}

pub fn list_feedback(conn: &Connection, proposal_id: i64) -> Result<Vec<FeedbackEntry>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, proposal_id, reviewer_name, body, created_at \
         FROM proposal_feedback WHERE proposal_id = ?1 ORDER BY id",
    )?;
    let entries = stmt
        .query_map(params![proposal_id], |row| {
            Ok(FeedbackEntry {
                id: row.get("id")?,
                proposal_id: row.get("proposal_id")?,
                reviewer_name: row.get("reviewer_name")?,
                body: row.get("body")?,
                created_at: row.get("created_at")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}
