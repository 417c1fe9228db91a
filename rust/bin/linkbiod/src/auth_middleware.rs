//! Session middleware.
//!
//! The session is the backend's access token, carried in the session
//! cookie or in `Authorization: Bearer <token>`. [`attach_session`] runs on
//! every request and attaches a verified [`Session`] when one is present;
//! [`require_session`] guards the editor routes and sends anonymous
//! visitors to the sign-in page.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use jsonwebtoken::{DecodingKey, Validation};
use linkbio_backend::session::AUDIENCE;
use linkbio_backend::{Session, SessionClaims};
use tracing::debug;

/// Where unauthenticated requests are sent.
pub const SIGN_IN_PATH: &str = "/auth";

/// Shared token verification settings for the middleware.
#[derive(Clone)]
pub struct SessionKeys {
    pub decoding_key: DecodingKey,
    pub validation: Validation,
    pub cookie_name: String,
}

impl SessionKeys {
    pub fn new(secret: &str, cookie_name: &str) -> Self {
        let mut validation = Validation::default();
        validation.set_audience(&[AUDIENCE]);
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            cookie_name: cookie_name.to_string(),
        }
    }

    /// Verify a token; signature, audience and expiry are all checked.
    pub fn verify(&self, token: &str) -> Result<Session, AuthError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        Ok(Session {
            claims: data.claims,
            access_token: token.to_string(),
        })
    }

    /// Verify whatever token the request carries.
    pub fn session_from_headers(&self, headers: &HeaderMap) -> Result<Session, AuthError> {
        let token = token_from_headers(headers, &self.cookie_name).ok_or(AuthError::MissingToken)?;
        self.verify(&token)
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::MissingToken => debug!("no session, redirecting to sign-in"),
            AuthError::InvalidToken(e) => debug!("rejected session token: {}", e),
        }
        Redirect::to(SIGN_IN_PATH).into_response()
    }
}

/// Cookie first, then the bearer header.
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    })
}

/// Attach a verified session, if any. Never rejects.
pub async fn attach_session(
    State(keys): State<Arc<SessionKeys>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Ok(session) = keys.session_from_headers(request.headers()) {
        request.extensions_mut().insert(session);
    }
    next.run(request).await
}

/// Require a valid session; redirect to sign-in otherwise.
pub async fn require_session(
    State(keys): State<Arc<SessionKeys>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if request.extensions().get::<Session>().is_none() {
        let session = keys.session_from_headers(request.headers())?;
        request.extensions_mut().insert(session);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use linkbio_backend::session::issue_token;

    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new("test-secret", "linkbio_session")
    }

    #[test]
    fn token_from_cookie_or_bearer() {
        let mut headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers, "linkbio_session"), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(token_from_headers(&headers, "linkbio_session").as_deref(), Some("abc"));

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; linkbio_session=xyz"));
        assert_eq!(token_from_headers(&headers, "linkbio_session").as_deref(), Some("xyz"));

        headers.insert(header::COOKIE, HeaderValue::from_static("linkbio_session="));
        assert_eq!(token_from_headers(&headers, "linkbio_session").as_deref(), Some("abc"));
    }

    #[test]
    fn verify_accepts_backend_tokens() {
        let token = issue_token("test-secret", "p-ada", Some("ada@example.com"), 60).unwrap();
        let session = keys().verify(&token).unwrap();
        assert_eq!(session.user_id(), "p-ada");
        assert_eq!(session.access_token, token);
    }

    #[test]
    fn verify_rejects_wrong_secret_and_garbage() {
        let token = issue_token("other-secret", "p-ada", None, 60).unwrap();
        assert!(matches!(keys().verify(&token), Err(AuthError::InvalidToken(_))));
        assert!(matches!(keys().verify("not.a.jwt"), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn verify_rejects_expired_tokens() {
        // Well past the default 60s leeway.
        let now = 1_700_000_000;
        let claims = SessionClaims {
            sub: "p-ada".into(),
            email: None,
            aud: AUDIENCE.into(),
            role: AUDIENCE.into(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(keys().verify(&token), Err(AuthError::InvalidToken(_))));
    }
}
