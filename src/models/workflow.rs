//! The proposal lifecycle engine: which status transitions exist, which
//! role may take each one, and what a given request should do.
//!
//! The graph is fixed:
//!
//! ```text
//! draft -> submitted            (applicant)
//! submitted -> under_review     (reviewer)
//! under_review -> approved      (reviewer)
//! under_review -> rejected      (reviewer)
//! approved -> assigned_to_staff (reviewer, with a staff name)
//! ```
//!
//! `approved`, `rejected`, and `assigned_to_staff` have no outgoing
//! edges; `assigned_to_staff` still allows staff metadata updates.

use super::proposal::Status;
use super::role::Role;
use crate::errors::AppError;

pub struct Edge {
    pub from: Status,
    pub to: Status,
    pub role: Role,
}

pub const TRANSITIONS: &[Edge] = &[
    Edge { from: Status::Draft, to: Status::Submitted, role: Role::Applicant },
    Edge { from: Status::Submitted, to: Status::UnderReview, role: Role::Reviewer },
    Edge { from: Status::UnderReview, to: Status::Approved, role: Role::Reviewer },
    Edge { from: Status::UnderReview, to: Status::Rejected, role: Role::Reviewer },
    Edge { from: Status::Approved, to: Status::AssignedToStaff, role: Role::Reviewer },
];

/// What a validated transition request should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Persist the new status.
    Apply,
    /// The proposal already holds the requested status; retried
    /// requests succeed without writing.
    NoOp,
}

/// Validate a requested transition for an actor.
///
/// Check order matters: a role that could never produce the requested
/// status is refused as `Forbidden` before the graph is consulted, so
/// an applicant asking for `approved` is always an authorization error
/// no matter where the proposal currently stands.
pub fn validate_transition(
    current: Status,
    requested: Status,
    role: Role,
) -> Result<Decision, AppError> {
    let incoming: Vec<&Edge> = TRANSITIONS.iter().filter(|e| e.to == requested).collect();

    // No edge in the whole graph produces this status (e.g. back to
    // draft): a graph violation for every role.
    if incoming.is_empty() {
        return Err(AppError::InvalidTransition {
            from: current.to_string(),
            to: requested.to_string(),
        });
    }

    if !incoming.iter().any(|e| e.role == role) {
        return Err(AppError::Forbidden(format!(
            "You are not authorized to move a proposal to '{requested}' as a {}",
            role.label()
        )));
    }

    if current == requested {
        return Ok(Decision::NoOp);
    }

    let edge = TRANSITIONS
        .iter()
        .find(|e| e.from == current && e.to == requested)
        .ok_or(AppError::InvalidTransition {
            from: current.to_string(),
            to: requested.to_string(),
        })?;

    if edge.role != role {
        return Err(AppError::Forbidden(format!(
            "Only a {} may move a proposal from '{current}' to '{requested}'",
            edge.role.label()
        )));
    }

    Ok(Decision::Apply)
}

/// All statuses the actor could move this proposal to from here.
pub fn available_transitions(current: Status, role: Role) -> Vec<Status> {
    TRANSITIONS
        .iter()
        .filter(|e| e.from == current && e.role == role)
        .map(|e| e.to)
        .collect()
}

/// True when no outgoing edge exists for the status.
pub fn is_terminal(status: Status) -> bool {
    !TRANSITIONS.iter().any(|e| e.from == status)
}
