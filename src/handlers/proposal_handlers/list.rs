use actix_web::{HttpResponse, web};

use crate::auth::identity::Identity;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::proposal::{self, ListQuery, filter};

/// GET /api/proposals
/// Role-scoped listing. The store query already applies visibility;
/// status/domain filters and the sort order come from query params.
pub async fn list(
    pool: web::Data<DbPool>,
    identity: Identity,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let visible =
        proposal::list_visible(&conn, identity.role, identity.user_id, &identity.name)?;

    let total_visible = visible.len();
    let proposals = filter::apply(visible, &query);
    let count = proposals.len();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "proposals": proposals,
        "count": count,
        "total": total_visible,
    })))
}
