//! Public pages that are not profiles, plus system endpoints.

use axum::Router;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use linkbio_core::html::{PageHead, render_page};
use linkbio_core::{DocumentRoot, Notifier};
use linkbio_profile::Viewer;
use linkbio_profile::api::NOT_FOUND_PATH;

use crate::routes::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index_page))
        .route("/how-to-use", get(how_to_use_page))
        .route(NOT_FOUND_PATH, get(not_found))
        .route("/health", get(health))
        .route("/version", get(version))
}

/// Top navigation; signed-in visitors get the dashboard and sign-out.
pub fn nav(signed_in: bool) -> &'static str {
    if signed_in {
        concat!(
            r#"<nav class="top"><a href="/">Home</a><a href="/dashboard">Dashboard</a>"#,
            r#"<form class="inline" method="post" action="/auth/logout"><button type="submit">Sign out</button></form></nav>"#,
        )
    } else {
        r#"<nav class="top"><a href="/">Home</a><a href="/how-to-use">How to use</a><a href="/auth">Sign in</a></nav>"#
    }
}

/// Full document for a non-profile page.
pub fn shell(title: &str, signed_in: bool, notifier: &Notifier, body: &str) -> String {
    let head = PageHead { title, favicon: None };
    let body = format!("{}{}", nav(signed_in), body);
    render_page(&head, &DocumentRoot::new(), notifier, &body)
}

async fn index_page(Viewer(session): Viewer) -> impl IntoResponse {
    Html(shell(
        "linkbio",
        session.is_some(),
        &Notifier::new(),
        include_str!("web/landing.html"),
    ))
}

async fn how_to_use_page(Viewer(session): Viewer) -> impl IntoResponse {
    Html(shell(
        "How to use",
        session.is_some(),
        &Notifier::new(),
        include_str!("web/how_to_use.html"),
    ))
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Html(shell("Page not found", false, &Notifier::new(), include_str!("web/not_found.html"))),
    )
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "linkbiod",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
