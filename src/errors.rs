use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Application error taxonomy. Every variant maps to a distinct HTTP
/// response with a message specific enough for the caller to act on.
#[derive(Debug)]
pub enum AppError {
    Db(rusqlite::Error),
    Pool(r2d2::Error),
    Hash(String),
    /// Malformed input (bad email shape, missing required field).
    Validation(String),
    /// Missing or unverifiable bearer token.
    InvalidToken(String),
    /// Authentication failed (bad credentials).
    Unauthorized(String),
    /// Authenticated, but the role is not authorized for the action.
    Forbidden(String),
    /// The stored role attribute is not one of the recognized roles.
    UnknownRole(String),
    /// Requested status is not a legal successor of the current one.
    InvalidTransition { from: String, to: String },
    /// The operation's state precondition does not hold.
    PreconditionFailed(String),
    /// A concurrent writer changed the record first; re-fetch and retry.
    Conflict(String),
    /// The notification service failed. Callers treat delivery as
    /// best-effort and must not roll back persisted state on this.
    Dispatch(String),
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Pool(e) => write!(f, "Pool error: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::Validation(msg) => write!(f, "{msg}"),
            AppError::InvalidToken(msg) => write!(f, "{msg}"),
            AppError::Unauthorized(msg) => write!(f, "{msg}"),
            AppError::Forbidden(msg) => write!(f, "{msg}"),
            AppError::UnknownRole(role) => {
                write!(f, "Account has no recognized role (found '{role}'); access denied")
            }
            AppError::InvalidTransition { from, to } => {
                write!(f, "This proposal cannot move from '{from}' to '{to}'")
            }
            AppError::PreconditionFailed(msg) => write!(f, "{msg}"),
            AppError::Conflict(msg) => write!(f, "{msg}"),
            AppError::Dispatch(msg) => write!(f, "Notification dispatch failed: {msg}"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = |msg: String| serde_json::json!({ "success": false, "message": msg });
        match self {
            AppError::Validation(_) => HttpResponse::BadRequest().json(body(self.to_string())),
            AppError::InvalidToken(_) | AppError::Unauthorized(_) => {
                HttpResponse::Unauthorized().json(body(self.to_string()))
            }
            AppError::Forbidden(_) | AppError::UnknownRole(_) => {
                HttpResponse::Forbidden().json(body(self.to_string()))
            }
            AppError::InvalidTransition { .. } | AppError::PreconditionFailed(_) => {
                HttpResponse::UnprocessableEntity().json(body(self.to_string()))
            }
            AppError::Conflict(_) => HttpResponse::Conflict().json(body(self.to_string())),
            AppError::NotFound => {
                HttpResponse::NotFound().json(body("Proposal not found".to_string()))
            }
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError()
                    .json(body("Internal server error".to_string()))
            }
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Pool(e)
    }
}
