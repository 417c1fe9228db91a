//! Password sign-in against the backend's auth service.
//!
//! A successful sign-in stores the backend access token in the session
//! cookie; the session middleware verifies it on later requests.

use axum::extract::{Form, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use linkbio_backend::ApiError;
use linkbio_core::Notifier;
use linkbio_profile::Viewer;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::pages::shell;
use crate::routes::AppState;

pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth", get(sign_in_page).post(sign_in))
        .route("/auth/logout", post(sign_out))
}

fn session_cookie(name: &str, token: &str, max_age_secs: u64) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}", name, token, max_age_secs)
}

fn sign_in_form(status: StatusCode, notifier: &Notifier) -> Response {
    (status, Html(shell("Sign in", false, notifier, include_str!("web/sign_in.html")))).into_response()
}

/// GET /auth
async fn sign_in_page(Viewer(session): Viewer) -> Response {
    if session.is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }
    sign_in_form(StatusCode::OK, &Notifier::new())
}

/// POST /auth
async fn sign_in(State(state): State<AppState>, Form(form): Form<SignInForm>) -> Response {
    let email = form.email.trim();
    match state.backend.sign_in(email, &form.password).await {
        Ok(grant) => {
            info!(user_id = %grant.user_id, "Signed in");
            let max_age = grant.expires_in.min(state.config.session.max_age_secs);
            let cookie = session_cookie(&state.config.session.cookie_name, &grant.access_token, max_age);
            ([(header::SET_COOKIE, cookie)], Redirect::to(DASHBOARD_PATH)).into_response()
        }
        Err(ApiError::Auth(reason)) => {
            warn!(email, "Sign-in rejected: {}", reason);
            let mut notifier = Notifier::new();
            notifier.error("Sign-in failed", "Invalid email or password.");
            sign_in_form(StatusCode::UNAUTHORIZED, &notifier)
        }
        Err(e) => {
            error!("Sign-in request failed: {}", e);
            let mut notifier = Notifier::new();
            notifier.destructive("Sign-in unavailable", e.to_string());
            sign_in_form(StatusCode::BAD_GATEWAY, &notifier)
        }
    }
}

/// POST /auth/logout
async fn sign_out(State(state): State<AppState>) -> Response {
    let cookie = session_cookie(&state.config.session.cookie_name, "", 0);
    ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_attributes() {
        assert_eq!(
            session_cookie("linkbio_session", "tok", 60),
            "linkbio_session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );
        assert!(session_cookie("sid", "", 0).starts_with("sid=;"));
    }
}
