use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::identity::Identity;
use crate::auth::validate;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::{invitation, proposal};
use crate::notify::{Dispatcher, InviteEmail};

use super::proposal_handlers::ensure_visible;

#[derive(Deserialize)]
pub struct InviteForm {
    pub proposal_id: i64,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub message: String,
}

/// POST /api/collaboration/invite
/// Invite a collaborator to a proposal. The email shape is validated
/// here, before anything else happens; a malformed address is a local
/// `Validation` failure and must never reach the dispatcher.
pub async fn invite(
    pool: web::Data<DbPool>,
    dispatcher: web::Data<dyn Dispatcher>,
    identity: Identity,
    form: web::Json<InviteForm>,
) -> Result<HttpResponse, AppError> {
    if let Some(msg) = validate::validate_email(&form.email)
        .or_else(|| validate::validate_required(&form.role, "Collaborator role", 100))
    {
        return Err(AppError::Validation(msg));
    }

    let conn = pool.get()?;
    let prop = proposal::find_by_id(&conn, form.proposal_id)?.ok_or(AppError::NotFound)?;
    ensure_visible(&identity, &prop)?;

    let email = form.email.trim();
    let stored = invitation::create(
        &conn,
        prop.id,
        email,
        form.role.trim(),
        form.message.trim(),
        &identity.name,
    )?;

    let message = if form.message.trim().is_empty() {
        format!("You have been invited to collaborate as a {}.", form.role.trim())
    } else {
        form.message.trim().to_string()
    };

    let result = dispatcher.send_invite(&InviteEmail {
        to_email: email,
        proposal_title: &prop.title,
        proposal_id: prop.id,
        inviter_name: &identity.name,
        role: form.role.trim(),
        message: &message,
    });

    match result {
        Ok(receipt) => {
            log::info!(
                "Collaboration invitation sent to {email} for proposal #{}",
                prop.id
            );
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": format!("Collaboration invitation sent to {email}"),
                "invitation": stored,
                "email_id": receipt.message_id,
                "delivered": receipt.delivered,
            })))
        }
        Err(e) => {
            log::warn!("Invitation email to {email} failed: {e}");
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": format!(
                    "Invitation recorded, but email delivery to {email} failed"
                ),
                "invitation": stored,
                "email_id": serde_json::Value::Null,
                "delivered": false,
            })))
        }
    }
}

/// GET /api/collaboration/invitations/{proposal_id}
/// Stored invitations for a proposal the caller can see.
pub async fn invitations(
    pool: web::Data<DbPool>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let proposal_id = path.into_inner();

    let conn = pool.get()?;
    let prop = proposal::find_by_id(&conn, proposal_id)?.ok_or(AppError::NotFound)?;
    ensure_visible(&identity, &prop)?;

    let items = invitation::find_for_proposal(&conn, proposal_id)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "invitations": items,
    })))
}
