use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::identity::Identity;
use crate::auth::validate;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::proposal::{self, ProgressForm, Status};
use crate::models::role::Role;
use crate::models::workflow::{self, Decision};
use crate::models::user;
use crate::notify::Dispatcher;

use super::ensure_visible;

#[derive(Deserialize)]
pub struct StatusForm {
    pub status: String,
}

#[derive(Deserialize)]
pub struct AssignForm {
    pub assigned_staff: String,
}

#[derive(Deserialize)]
pub struct FeedbackForm {
    pub feedback: String,
}

/// PATCH /api/proposals/{id}/status
/// Apply a lifecycle transition. The engine decides legality and
/// authorization; persistence is a compare-and-set against the status
/// this request validated, so a concurrent transition loses cleanly.
pub async fn update_status(
    pool: web::Data<DbPool>,
    identity: Identity,
    path: web::Path<i64>,
    form: web::Json<StatusForm>,
) -> Result<HttpResponse, AppError> {
    let proposal_id = path.into_inner();
    let requested = Status::parse(&form.status)?;

    // Staff assignment carries a staff name atomically; it has its own
    // operation and cannot happen through a bare status write.
    if requested == Status::AssignedToStaff {
        return Err(AppError::Validation(
            "Assigning staff requires the assign operation with a staff name".to_string(),
        ));
    }

    let conn = pool.get()?;
    let current = proposal::find_by_id(&conn, proposal_id)?.ok_or(AppError::NotFound)?;

    // Applicants act only on their own proposals; reviewers on any.
    if identity.role == Role::Applicant && current.author_id != identity.user_id {
        return Err(AppError::Forbidden(
            "You may only submit your own proposals".to_string(),
        ));
    }

    let decision = workflow::validate_transition(current.status, requested, identity.role)?;

    if decision == Decision::NoOp {
        return Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "proposal": current,
            "changed": false,
        })));
    }

    let reviewer = (identity.role == Role::Reviewer).then_some(identity.name.as_str());
    let updated =
        proposal::update_status_cas(&conn, proposal_id, current.status, requested, reviewer)?;

    log::info!(
        "Proposal #{proposal_id} moved '{}' -> '{}' by '{}'",
        current.status,
        updated.status,
        identity.name
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "proposal": updated,
        "changed": true,
    })))
}

/// PATCH /api/proposals/{id}/assign
/// Reviewer assigns an approved proposal to a staff member; the status
/// moves to `assigned_to_staff` in the same write.
pub async fn assign(
    pool: web::Data<DbPool>,
    identity: Identity,
    path: web::Path<i64>,
    form: web::Json<AssignForm>,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::Reviewer, "assign staff to a proposal")?;

    let staff_name = form.assigned_staff.trim();
    if staff_name.is_empty() {
        return Err(AppError::Validation("Staff name is required".to_string()));
    }

    let proposal_id = path.into_inner();
    let conn = pool.get()?;
    let updated = proposal::assign_staff_cas(&conn, proposal_id, staff_name, &identity.name)?;

    log::info!("Proposal #{proposal_id} assigned to '{staff_name}' by '{}'", identity.name);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "proposal": updated,
    })))
}

/// POST /api/proposals/{id}/feedback
/// Persist a feedback entry against the proposal, then notify the
/// author. Delivery is best-effort: a dispatcher failure is logged and
/// reported, never rolled back.
pub async fn feedback(
    pool: web::Data<DbPool>,
    dispatcher: web::Data<dyn Dispatcher>,
    identity: Identity,
    path: web::Path<i64>,
    form: web::Json<FeedbackForm>,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::Reviewer, "send feedback on a proposal")?;

    if let Some(msg) = validate::validate_required(&form.feedback, "Feedback", 10_000) {
        return Err(AppError::Validation(msg));
    }

    let proposal_id = path.into_inner();
    let conn = pool.get()?;
    let prop = proposal::find_by_id(&conn, proposal_id)?.ok_or(AppError::NotFound)?;

    let entry =
        proposal::append_feedback(&conn, proposal_id, &identity.name, form.feedback.trim())?;

    let author = user::find_by_id(&conn, prop.author_id)?.ok_or(AppError::NotFound)?;
    let delivered = match dispatcher.send_feedback(
        &author.email,
        prop.id,
        &prop.title,
        form.feedback.trim(),
    ) {
        Ok(receipt) => receipt.delivered,
        Err(e) => {
            log::warn!("Feedback notification for proposal #{proposal_id} failed: {e}");
            false
        }
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "feedback": entry,
        "delivered": delivered,
    })))
}

/// PATCH /api/proposals/{id}/progress
/// Staff update execution metadata on a proposal assigned to them.
pub async fn progress(
    pool: web::Data<DbPool>,
    identity: Identity,
    path: web::Path<i64>,
    form: web::Json<ProgressForm>,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::Staff, "update execution progress")?;

    if let Some(pct) = form.completion_percentage {
        if !(0..=100).contains(&pct) {
            return Err(AppError::Validation(
                "Completion percentage must be between 0 and 100".to_string(),
            ));
        }
    }

    let proposal_id = path.into_inner();
    let conn = pool.get()?;
    let prop = proposal::find_by_id(&conn, proposal_id)?.ok_or(AppError::NotFound)?;
    ensure_visible(&identity, &prop)?;

    let updated = proposal::update_progress(
        &conn,
        proposal_id,
        &identity.name,
        form.priority.as_deref(),
        form.deadline.as_deref(),
        form.completion_percentage,
    )?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "proposal": updated,
    })))
}
