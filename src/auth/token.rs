//! Bearer-token issuance and verification (HS256).
//!
//! Tokens are standard three-segment JWTs: base64url header and claims,
//! HMAC-SHA256 signature over the first two segments. The secret comes
//! from `JWT_SECRET`; expiry is configurable and defaults to 7 days.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::errors::AppError;
use crate::models::role::Role;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_EXPIRY_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub name: String,
    pub role: Role,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

fn sign(secret: &[u8], signing_input: &str) -> Result<Vec<u8>, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Hash(format!("Bad signing key: {e}")))?;
    mac.update(signing_input.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Issue a signed token for an authenticated user.
pub fn issue_token(
    secret: &[u8],
    user_id: i64,
    name: &str,
    role: Role,
    expires_in_secs: i64,
) -> Result<String, AppError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        name: name.to_string(),
        role,
        iat: now,
        exp: now + expires_in_secs,
    };

    let header = Header { alg: "HS256".to_string(), typ: "JWT".to_string() };
    let header_json =
        serde_json::to_vec(&header).map_err(|e| AppError::Hash(e.to_string()))?;
    let claims_json =
        serde_json::to_vec(&claims).map_err(|e| AppError::Hash(e.to_string()))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );
    let signature = sign(secret, &signing_input)?;

    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

/// Verify a token's structure, signature, and expiry. Returns the
/// embedded claims on success.
pub fn verify_token(secret: &[u8], token: &str) -> Result<Claims, AppError> {
    let invalid = || AppError::InvalidToken("Invalid token".to_string());

    let mut parts = token.split('.');
    let (header_b64, claims_b64, sig_b64) =
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(c), Some(s), None) => (h, c, s),
            _ => return Err(invalid()),
        };

    let header_json = URL_SAFE_NO_PAD.decode(header_b64).map_err(|_| invalid())?;
    let header: Header = serde_json::from_slice(&header_json).map_err(|_| invalid())?;
    if header.alg != "HS256" {
        return Err(invalid());
    }

    let signature = URL_SAFE_NO_PAD.decode(sig_b64).map_err(|_| invalid())?;
    let signing_input = format!("{header_b64}.{claims_b64}");
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Hash(format!("Bad signing key: {e}")))?;
    mac.update(signing_input.as_bytes());
    // Constant-time comparison via the Mac trait.
    mac.verify_slice(&signature).map_err(|_| invalid())?;

    let claims_json = URL_SAFE_NO_PAD.decode(claims_b64).map_err(|_| invalid())?;
    let claims: Claims = serde_json::from_slice(&claims_json).map_err(|_| invalid())?;

    if claims.exp <= chrono::Utc::now().timestamp() {
        return Err(AppError::InvalidToken("Token has expired".to_string()));
    }

    Ok(claims)
}
