//! Session tokens.
//!
//! The server issues HS256 JWTs; the subject is the user id, with the email
//! carried alongside. Tokens expire after one day.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Email at issue time.
    pub email: String,
    /// Expiration (Unix timestamp).
    pub exp: u64,
    /// Issued at (Unix timestamp).
    pub iat: u64,
}

const TOKEN_LIFETIME_SECS: u64 = 24 * 60 * 60;

fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set, using development default");
        "development-secret-change-in-production".to_string()
    })
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/// Create a token for a user.
pub fn create_token(
    user_id: Uuid,
    email: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = unix_now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: now + TOKEN_LIFETIME_SECS,
        iat: now,
    };

    let key = EncodingKey::from_secret(jwt_secret().as_ref());
    encode(&Header::default(), &claims, &key)
}

/// Verify a token and return its claims.
pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(jwt_secret().as_ref());
    let token_data = decode::<Claims>(token, &key, &Validation::default())?;
    Ok(token_data.claims)
}
