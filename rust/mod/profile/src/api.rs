use std::convert::Infallible;
use std::sync::Arc;

use axum::Router;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use linkbio_backend::{Backend, Session};

use crate::loader::{LoadError, load_profile};
use crate::page::ProfilePage;

/// Where a request without a username is sent.
pub const NOT_FOUND_PATH: &str = "/not-found";

pub type AppState = Arc<dyn Backend>;

/// The signed-in visitor, if the session middleware attached one.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<Session>);

impl<S: Send + Sync> FromRequestParts<S> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(parts.extensions.get::<Session>().cloned()))
    }
}

pub fn routes(backend: AppState) -> Router {
    Router::new()
        .route("/{username}", get(view_profile))
        .with_state(backend)
}

/// GET /{username}
async fn view_profile(
    State(backend): State<AppState>,
    Viewer(session): Viewer,
    Path(username): Path<String>,
) -> Response {
    let mut page = ProfilePage::new().with_viewer(session.map(|s| s.claims.sub));
    let ticket = page.begin();
    let result = load_profile(backend.as_ref(), Some(&username)).await;
    if matches!(result, Err(LoadError::MissingInput)) {
        return Redirect::to(NOT_FOUND_PATH).into_response();
    }
    page.commit(ticket, result);

    let (status, html) = page.render();
    (status, Html(html)).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::loader::tests::{Failing, seeded};

    async fn get_page(router: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = router.oneshot(req).await.unwrap();
        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        (status, location, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn renders_public_profile() {
        let (status, _, html) = get_page(routes(Arc::new(seeded())), "/ada").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<title>Ada Lovelace (@ada)</title>"));
        assert!(html.contains(r#"data-theme="ocean""#));
        assert!(html.contains(r#"class="layout-bento"#));
        assert!(html.contains(r#"href="https://notes.example""#));
        assert!(!html.contains(r#"class="toasts""#));
    }

    #[tokio::test]
    async fn unknown_profile_is_404_with_error_toast() {
        let (status, _, html) = get_page(routes(Arc::new(seeded())), "/nobody").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains(r#"class="state-not-found""#));
        assert!(html.contains(r#"class="toast toast-error""#));
    }

    #[tokio::test]
    async fn blank_username_redirects() {
        let (status, location, _) = get_page(routes(Arc::new(seeded())), "/%20").await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some(NOT_FOUND_PATH));
    }

    #[tokio::test]
    async fn backend_failure_is_502_with_destructive_toast() {
        let (status, _, html) = get_page(routes(Arc::new(Failing(500))), "/ada").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(html.contains(r#"class="state-error""#));
        assert!(html.contains(r#"class="toast toast-destructive""#));
        assert!(html.contains("database unavailable"));
    }

    #[tokio::test]
    async fn missing_settings_has_no_toast() {
        let (status, _, html) = get_page(routes(Arc::new(seeded())), "/bob").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!html.contains(r#"class="toasts""#));
    }
}
