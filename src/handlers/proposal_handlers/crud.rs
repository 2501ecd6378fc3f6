use actix_web::{HttpResponse, web};

use crate::auth::identity::Identity;
use crate::auth::validate;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::proposal::{self, ProposalForm, Status};
use crate::models::role::Role;
use crate::models::workflow;

use super::ensure_visible;

/// POST /api/proposals
/// Create a proposal. `submit: true` enters the graph at `submitted`,
/// otherwise the proposal starts as a draft.
pub async fn create(
    pool: web::Data<DbPool>,
    identity: Identity,
    form: web::Json<ProposalForm>,
) -> Result<HttpResponse, AppError> {
    identity.require(Role::Applicant, "create a proposal")?;

    if let Some(msg) = validate::validate_required(&form.title, "Title", 200)
        .or_else(|| validate::validate_required(&form.description, "Description", 10_000))
        .or_else(|| validate::validate_budget(form.budget))
    {
        return Err(AppError::Validation(msg));
    }

    let initial_status = if form.submit { Status::Submitted } else { Status::Draft };

    let conn = pool.get()?;
    let created = proposal::create(
        &conn,
        identity.user_id,
        form.title.trim(),
        form.description.trim(),
        form.domain.trim(),
        form.budget,
        initial_status,
    )?;

    log::info!(
        "Proposal #{} created by '{}' with status '{}'",
        created.id,
        identity.name,
        created.status
    );

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "proposal": created,
    })))
}

/// GET /api/proposals/{id}
/// Visibility-checked detail view with persisted feedback and the
/// transitions the caller could take from here.
pub async fn detail(
    pool: web::Data<DbPool>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let proposal_id = path.into_inner();

    let conn = pool.get()?;
    let prop = proposal::find_by_id(&conn, proposal_id)?.ok_or(AppError::NotFound)?;
    ensure_visible(&identity, &prop)?;

    let feedback = proposal::list_feedback(&conn, proposal_id)?;
    let available: Vec<&str> = workflow::available_transitions(prop.status, identity.role)
        .into_iter()
        .map(|s| s.as_str())
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "proposal": prop,
        "feedback": feedback,
        "available_transitions": available,
    })))
}
