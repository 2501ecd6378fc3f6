use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};

use crate::auth::token;
use crate::errors::AppError;
use crate::models::role::Role;

/// Token verification parameters, shared as app data.
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: Vec<u8>,
    pub expires_in_secs: i64,
}

/// The authenticated actor for the current request, resolved from the
/// bearer token's claims. Role is assigned at provisioning and carried
/// in the token, never inferred per request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub name: String,
    pub role: Role,
}

impl Identity {
    /// Gate an action on an exact role, with a message that names both
    /// the required and the actual role.
    pub fn require(&self, role: Role, action: &str) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Only a {} may {action}; you are signed in as a {}",
                role.label(),
                self.role.label()
            )))
        }
    }
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

fn extract(req: &HttpRequest) -> Result<Identity, AppError> {
    let config = req
        .app_data::<web::Data<TokenConfig>>()
        .ok_or_else(|| AppError::InvalidToken("Token verification is not configured".to_string()))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::InvalidToken("Missing Authorization header".to_string()))?;

    let raw = header_value.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::InvalidToken("Authorization header must use the Bearer scheme".to_string())
    })?;

    let claims = token::verify_token(&config.secret, raw.trim())?;

    Ok(Identity {
        user_id: claims.sub,
        name: claims.name,
        role: claims.role,
    })
}
