//! Route registration: public pages, sign-in, the session-gated editor
//! and module routes, all under the session middleware.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use linkbio_backend::Backend;
use tracing::info;

use crate::auth_middleware::{self, SessionKeys};
use crate::config::ServerConfig;
use crate::{editor, login, pages};

/// Application shared state.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub session_keys: Arc<SessionKeys>,
    pub config: Arc<ServerConfig>,
}

/// Build the complete router with all routes.
pub fn build_router(state: AppState, module_routes: Vec<(&str, Router)>) -> Router {
    let session_keys = state.session_keys.clone();

    let gated = editor::routes().route_layer(middleware::from_fn_with_state(
        session_keys.clone(),
        auth_middleware::require_session,
    ));

    let mut app: Router<()> = Router::new()
        .merge(pages::routes())
        .merge(login::routes())
        .merge(gated)
        .with_state(state);

    // Module routes are already Router<()> (they called .with_state() internally).
    for (name, router) in module_routes {
        info!(module = name, "Mounting module routes");
        app = app.merge(router);
    }

    app.fallback(pages::not_found)
        .layer(middleware::from_fn_with_state(
            session_keys,
            auth_middleware::attach_session,
        ))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use linkbio_backend::session::issue_token;
    use linkbio_backend::{CachedBackend, MemoryBackend, ProfileRow, QueryConfig, SettingsRow};
    use linkbio_core::Module;
    use linkbio_profile::ProfileModule;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{BackendConfig, CacheConfig, DemoConfig, SessionConfig};

    const SECRET: &str = "test-secret";

    fn app() -> Router {
        let memory = MemoryBackend::new(SECRET);
        memory.insert_profile(ProfileRow {
            id: Some("p-ada".into()),
            username: Some("ada".into()),
            full_name: Some("Ada Lovelace".into()),
            ..Default::default()
        });
        memory.insert_settings(SettingsRow {
            id: Some("p-ada".into()),
            links: Some(serde_json::json!([{"id": "l1", "title": "Notes", "url": "notes.example"}])),
            ..Default::default()
        });
        memory.insert_profile(ProfileRow {
            id: Some("p-bob".into()),
            username: Some("bob".into()),
            ..Default::default()
        });
        memory.insert_profile(ProfileRow {
            id: Some("p-odd".into()),
            username: Some("odd one\u{7}".into()),
            ..Default::default()
        });
        memory.add_account("ada@example.com", "pw", "p-ada").unwrap();

        let backend: Arc<dyn Backend> = Arc::new(CachedBackend::new(Arc::new(memory), QueryConfig::default()));
        let config = ServerConfig {
            backend: BackendConfig::default(),
            session: SessionConfig {
                jwt_secret: SECRET.into(),
                cookie_name: "linkbio_session".into(),
                max_age_secs: 600,
            },
            cache: CacheConfig::default(),
            demo: DemoConfig::default(),
        };
        let state = AppState {
            backend: backend.clone(),
            session_keys: Arc::new(SessionKeys::new(SECRET, "linkbio_session")),
            config: Arc::new(config),
        };
        let profile = ProfileModule::new(backend);
        build_router(state, vec![(profile.name(), profile.routes())])
    }

    fn token(user_id: &str) -> String {
        issue_token(SECRET, user_id, Some("ada@example.com"), 600).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> Response {
        app.clone().oneshot(req).await.unwrap()
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("linkbio_session={}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("linkbio_session={}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn location(resp: &Response) -> Option<&str> {
        resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok())
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn gated_routes_redirect_anonymous_visitors() {
        let app = app();
        for uri in ["/dashboard", "/edit-profile/ada", "/appearance", "/edit-links", "/settings"] {
            let resp = send(&app, get(uri, None)).await;
            assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(location(&resp), Some("/auth"), "{}", uri);
        }
        let resp = send(&app, get("/dashboard", Some("garbage"))).await;
        assert_eq!(location(&resp), Some("/auth"));
    }

    #[tokio::test]
    async fn gated_routes_pass_with_session() {
        let app = app();
        let token = token("p-ada");
        for uri in ["/dashboard", "/edit-profile/ada", "/appearance", "/edit-links", "/settings"] {
            let resp = send(&app, get(uri, Some(&token))).await;
            assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
        }

        let req = Request::builder()
            .uri("/dashboard")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let html = body_text(send(&app, req).await).await;
        assert!(html.contains("Hi, Ada Lovelace"));
        assert!(html.contains(r#"href="/edit-profile/ada""#));
    }

    #[tokio::test]
    async fn usernames_are_percent_encoded_in_paths() {
        let app = app();
        let token = token("p-odd");
        let editor = "/edit-profile/odd%20one%07";

        let resp = send(&app, get(editor, Some(&token))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains(r#"action="/edit-profile/odd%20one%07""#));

        let resp = send(&app, post_form(editor, Some(&token), "full_name=Odd&bio=&avatar_url=&custom_title=")).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), Some("/edit-profile/odd%20one%07?saved=1"));

        let html = body_text(send(&app, get("/dashboard", Some(&token))).await).await;
        assert!(html.contains(r#"href="/odd%20one%07""#));
    }

    #[tokio::test]
    async fn public_routes() {
        let app = app();
        assert_eq!(send(&app, get("/", None)).await.status(), StatusCode::OK);
        assert_eq!(send(&app, get("/how-to-use", None)).await.status(), StatusCode::OK);
        assert_eq!(send(&app, get("/auth", None)).await.status(), StatusCode::OK);
        assert_eq!(send(&app, get("/health", None)).await.status(), StatusCode::OK);
        assert_eq!(send(&app, get("/version", None)).await.status(), StatusCode::OK);
        assert_eq!(send(&app, get("/ada", None)).await.status(), StatusCode::OK);
        assert_eq!(send(&app, get("/not-found", None)).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(send(&app, get("/a/b/c", None)).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sign_in_sets_cookie_and_logout_clears_it() {
        let app = app();
        let resp = send(&app, post_form("/auth", None, "email=ada%40example.com&password=pw")).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), Some("/dashboard"));
        let cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap().to_string();
        assert!(cookie.starts_with("linkbio_session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=600"));

        let token = cookie
            .trim_start_matches("linkbio_session=")
            .split(';')
            .next()
            .unwrap()
            .to_string();
        assert_eq!(send(&app, get("/dashboard", Some(&token))).await.status(), StatusCode::OK);
        // Already signed in: the form redirects onward.
        assert_eq!(location(&send(&app, get("/auth", Some(&token))).await), Some("/dashboard"));

        let resp = send(&app, post_form("/auth/logout", Some(&token), "")).await;
        assert_eq!(location(&resp), Some("/"));
        let cleared = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cleared.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn wrong_password_rerenders_form() {
        let app = app();
        let resp = send(&app, post_form("/auth", None, "email=ada%40example.com&password=nope")).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
        assert!(body_text(resp).await.contains(r#"class="toast toast-error""#));
    }

    #[tokio::test]
    async fn editing_someone_else_is_forbidden() {
        let app = app();
        let resp = send(&app, get("/edit-profile/bob", Some(&token("p-ada")))).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn edit_profile_without_username_fires_destructive_toast() {
        let app = app();
        let resp = send(&app, get("/edit-profile", Some(&token("p-ada")))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(resp).await.contains(r#"class="toast toast-destructive""#));
    }

    #[tokio::test]
    async fn saves_show_on_public_page() {
        let app = app();
        let token = token("p-ada");

        let resp = send(&app, post_form("/edit-profile/ada", Some(&token), "full_name=Countess+Ada&bio=Engines&custom_title=Ada%27s+page")).await;
        assert_eq!(location(&resp), Some("/edit-profile/ada?saved=1"));
        let html = body_text(send(&app, get("/edit-profile/ada?saved=1", Some(&token))).await).await;
        assert!(html.contains(r#"class="toast toast-success""#));

        let resp = send(&app, post_form("/appearance", Some(&token), "theme_id=midnight&font_style=mono&layout_type=mixed&dark_mode=on&background_url=")).await;
        assert_eq!(location(&resp), Some("/appearance?saved=1"));

        let resp = send(&app, post_form("/edit-links", Some(&token), "action=add&title=Shop&url=shop.example&icon=cart&display=both")).await;
        assert_eq!(location(&resp), Some("/edit-links?saved=1"));
        let resp = send(&app, post_form("/edit-links", Some(&token), "action=remove&id=l1")).await;
        assert_eq!(location(&resp), Some("/edit-links?saved=1"));

        let html = body_text(send(&app, get("/ada", None)).await).await;
        assert!(html.contains("<title>Ada&#39;s page</title>"));
        assert!(html.contains("<h1>Countess Ada</h1>"));
        assert!(html.contains(r#"data-theme="midnight""#));
        assert!(html.contains(r#"class="dark""#));
        assert!(html.contains(r#"class="layout-mixed"#));
        assert!(html.contains(r#"href="https://shop.example""#));
        assert!(!html.contains("notes.example"));
    }

    #[tokio::test]
    async fn owner_sees_edit_link_on_own_page() {
        let app = app();
        let html = body_text(send(&app, get("/ada", Some(&token("p-ada")))).await).await;
        assert!(html.contains(r#"class="edit-link""#));
        let html = body_text(send(&app, get("/ada", None)).await).await;
        assert!(!html.contains(r#"class="edit-link""#));
    }
}
