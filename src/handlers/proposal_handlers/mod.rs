mod crud;
mod list;
mod workflow;

pub use crud::*;
pub use list::*;
pub use workflow::*;

use crate::auth::identity::Identity;
use crate::errors::AppError;
use crate::models::proposal::Proposal;
use crate::models::role::Role;

/// Visibility check for a single proposal, mirroring the list scoping:
/// applicants see their own, staff see their assignments, reviewers see
/// everything.
pub(crate) fn ensure_visible(identity: &Identity, prop: &Proposal) -> Result<(), AppError> {
    let visible = match identity.role {
        Role::Reviewer => true,
        Role::Applicant => prop.author_id == identity.user_id,
        Role::Staff => prop.assigned_staff.as_deref() == Some(identity.name.as_str()),
    };
    if visible {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Proposal #{} is not visible to your account",
            prop.id
        )))
    }
}
