use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::identity::TokenConfig;
use crate::auth::{password, token, validate};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::role::Role;
use crate::models::user::{self, NewUser, UserDisplay};

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// POST /api/auth/register
/// Provision an applicant account and sign it in. Reviewer and staff
/// accounts are provisioned out of band (seeding), never self-service.
pub async fn register(
    pool: web::Data<DbPool>,
    config: web::Data<TokenConfig>,
    form: web::Json<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    if let Some(msg) = validate::validate_username(&form.username)
        .or_else(|| validate::validate_email(&form.email))
        .or_else(|| validate::validate_required(&form.display_name, "Display name", 100))
        .or_else(|| validate::validate_password(&form.password))
    {
        return Err(AppError::Validation(msg));
    }

    let conn = pool.get()?;
    if user::username_taken(&conn, form.username.trim())? {
        return Err(AppError::Conflict(format!(
            "Username '{}' is already taken",
            form.username.trim()
        )));
    }

    let hash = password::hash_password(&form.password)?;
    let user_id = user::create(
        &conn,
        &NewUser {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            display_name: form.display_name.trim().to_string(),
            password: hash,
            role: Role::Applicant,
        },
    )?;

    let created = user::find_by_id(&conn, user_id)?.ok_or(AppError::NotFound)?;
    let signed = token::issue_token(
        &config.secret,
        created.id,
        &created.display_name,
        created.role,
        config.expires_in_secs,
    )?;

    log::info!("Registered applicant '{}' (#{})", created.username, created.id);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "token": signed,
        "user": UserDisplay::from(&created),
    })))
}

/// POST /api/auth/login
/// Verify credentials and issue a bearer token carrying the account's
/// role. The failure message never reveals which half was wrong.
pub async fn login(
    pool: web::Data<DbPool>,
    config: web::Data<TokenConfig>,
    form: web::Json<LoginForm>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let found = user::find_by_username(&conn, form.username.trim())?;

    let user = match found {
        Some(u) if password::verify_password(&form.password, &u.password)? => u,
        _ => {
            return Err(AppError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }
    };

    let signed = token::issue_token(
        &config.secret,
        user.id,
        &user.display_name,
        user.role,
        config.expires_in_secs,
    )?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "token": signed,
        "user": UserDisplay::from(&user),
    })))
}
