//! Session tokens issued by the backend's auth service.

use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use crate::ApiError;

/// Audience the backend stamps on user access tokens.
pub const AUDIENCE: &str = "authenticated";

/// JWT claims of a backend access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: user id, which is also the profile id.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub aud: String,
    #[serde(default)]
    pub role: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// A verified session attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub claims: SessionClaims,
    /// Raw token, forwarded to the backend on writes.
    pub access_token: String,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.claims.sub
    }
}

/// Result of a successful sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionGrant {
    pub access_token: String,
    pub expires_in: u64,
    pub user_id: String,
}

/// Sign an HS256 access token the way the backend does.
pub fn issue_token(
    secret: &str,
    user_id: &str,
    email: Option<&str>,
    ttl_secs: u64,
) -> Result<String, ApiError> {
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user_id.to_string(),
        email: email.map(str::to_string),
        aud: AUDIENCE.to_string(),
        role: AUDIENCE.to_string(),
        iat: now,
        exp: now + ttl_secs as i64,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Auth(format!("failed to sign token: {}", e)))
}
