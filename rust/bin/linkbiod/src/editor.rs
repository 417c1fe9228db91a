//! Editor pages for the signed-in owner.
//!
//! Every route here sits behind `require_session`, so handlers can take
//! the [`Session`] from request extensions. Saves write through the
//! backend and redirect back with `?saved=1`, which shows a success toast.

use axum::extract::{Extension, Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use linkbio_backend::{ApiError, ProfilePatch, Session, SettingsPatch};
use linkbio_core::html::{PageHead, escape, render_page};
use linkbio_core::{DocumentRoot, Notifier, ServiceError};
use linkbio_profile::layout::ICONS;
use linkbio_profile::model::{
    BackgroundStyle, DisplayMode, LayoutType, Link, LinkEdit, apply_edit, background_value, links_value,
};
use linkbio_profile::theme::{FONTS, THEMES, font_family, resolve_theme};
use linkbio_profile::url::format_url;
use linkbio_profile::{LoadError, LoadedProfile, edit_profile_target, load_profile_by_id};
use serde::Deserialize;
use tracing::{error, info};

use crate::login::DASHBOARD_PATH;
use crate::pages::{nav, shell};
use crate::routes::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(DASHBOARD_PATH, get(dashboard))
        .route("/edit-profile", get(edit_profile_without_username))
        .route("/edit-profile/{username}", get(edit_profile_page).post(save_profile))
        .route("/appearance", get(appearance_page).post(save_appearance))
        .route("/edit-links", get(links_page).post(save_links))
        .route("/settings", get(settings_page).post(save_settings))
}

#[derive(Debug, Default, Deserialize)]
pub struct SavedQuery {
    #[serde(default)]
    saved: Option<String>,
}

impl SavedQuery {
    fn notifier(&self) -> Notifier {
        let mut notifier = Notifier::new();
        if self.saved.is_some() {
            notifier.success("Saved", "Your changes are live.");
        }
        notifier
    }
}

// ── Shared rendering ────────────────────────────────────────────────

/// Editor document, styled with the owner's own dark mode and font.
fn editor_page(title: &str, owner: &LoadedProfile, notifier: &Notifier, body: &str) -> Response {
    let root = DocumentRoot::new();
    let _style = root.apply_style(owner.settings.is_dark_mode, font_family(&owner.settings.font_style));
    let head = PageHead {
        title,
        favicon: owner.settings.favicon_url.as_deref(),
    };
    let body = format!("{}<main class=\"editor\">{}</main>", nav(true), body);
    Html(render_page(&head, &root, notifier, &body)).into_response()
}

fn failure_page(status: StatusCode, title: &str, notifier: &Notifier) -> Response {
    let body = format!(
        r#"<div class="state-error"><h1>{}</h1><p><a href="{}">Back to dashboard</a></p></div>"#,
        escape(title),
        DASHBOARD_PATH
    );
    (status, Html(shell(title, true, notifier, &body))).into_response()
}

fn load_failed(e: LoadError) -> Response {
    error!("Failed to load owner profile: {}", e);
    let mut notifier = Notifier::new();
    if let Some(toast) = e.notification() {
        notifier.push(toast);
    }
    failure_page(e.status_code(), "Could not load your profile", &notifier)
}

fn save_failed(e: ApiError) -> Response {
    error!("Failed to save changes: {}", e);
    let err = ServiceError::from(e);
    let mut notifier = Notifier::new();
    notifier.destructive("Could not save changes", err.to_string());
    failure_page(err.status_code(), "Could not save changes", &notifier)
}

fn rejected(status: StatusCode, title: &str, message: &str) -> Response {
    let mut notifier = Notifier::new();
    notifier.error(title, message);
    failure_page(status, title, &notifier)
}

async fn load_owner(state: &AppState, session: &Session) -> Result<LoadedProfile, Response> {
    load_profile_by_id(state.backend.as_ref(), session.user_id())
        .await
        .map_err(load_failed)
}

fn saved_redirect(path: &str) -> Response {
    Redirect::to(&format!("{}?saved=1", path)).into_response()
}

fn options<'a>(items: impl Iterator<Item = (&'a str, &'a str)>, selected: &str) -> String {
    items
        .map(|(value, label)| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                escape(value),
                if value == selected { " selected" } else { "" },
                escape(label)
            )
        })
        .collect()
}

// ── Dashboard ───────────────────────────────────────────────────────

/// GET /dashboard
async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<SavedQuery>,
) -> Response {
    let owner = match load_owner(&state, &session).await {
        Ok(owner) => owner,
        Err(resp) => return resp,
    };
    let mut notifier = query.notifier();
    let profile = &owner.profile;
    let edit_target = edit_profile_target(Some(&profile.username), &mut notifier)
        .unwrap_or_else(|| DASHBOARD_PATH.to_string());

    let body = format!(
        concat!(
            "<h1>Hi, {name}</h1>",
            r#"<p>Your page: <a href="{path}">{path}</a></p>"#,
            "<ul><li>{links} links</li><li>Theme: {theme}</li><li>Layout: {layout}</li></ul>",
            r#"<p><a href="{edit}">Edit profile</a> · <a href="/edit-links">Links</a> · "#,
            r#"<a href="/appearance">Appearance</a> · <a href="/settings">Settings</a></p>"#,
        ),
        name = escape(profile.display_name()),
        path = escape(&profile.public_path()),
        links = owner.settings.links.len(),
        theme = resolve_theme(&owner.settings.theme_id).label,
        layout = owner.settings.layout_type.as_str(),
        edit = escape(&edit_target),
    );
    editor_page("Dashboard", &owner, &notifier, &body)
}

// ── Profile ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    bio: String,
    #[serde(default)]
    avatar_url: String,
    #[serde(default)]
    custom_title: String,
}

/// Owner's profile when `username` names it; an error page otherwise.
async fn editable_profile(state: &AppState, session: &Session, username: Option<&str>) -> Result<LoadedProfile, Response> {
    let mut notifier = Notifier::new();
    let Some(target) = edit_profile_target(username, &mut notifier) else {
        return Err(failure_page(StatusCode::BAD_REQUEST, "Cannot edit profile", &notifier));
    };
    let owner = load_owner(state, session).await?;
    if target != owner.profile.edit_path() {
        return Err(rejected(
            StatusCode::FORBIDDEN,
            "Cannot edit profile",
            "You can only edit your own profile.",
        ));
    }
    Ok(owner)
}

/// GET /edit-profile
async fn edit_profile_without_username(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Response {
    match editable_profile(&state, &session, None).await {
        Ok(owner) => Redirect::to(&owner.profile.edit_path()).into_response(),
        Err(resp) => resp,
    }
}

/// GET /edit-profile/{username}
async fn edit_profile_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(username): Path<String>,
    Query(query): Query<SavedQuery>,
) -> Response {
    let owner = match editable_profile(&state, &session, Some(&username)).await {
        Ok(owner) => owner,
        Err(resp) => return resp,
    };
    let profile = &owner.profile;
    let body = format!(
        concat!(
            "<h1>Edit profile</h1>",
            r#"<form class="stack" method="post" action="{action}">"#,
            r#"<label>Display name <input name="full_name" value="{full_name}"></label>"#,
            r#"<label>Bio <textarea name="bio" rows="4">{bio}</textarea></label>"#,
            r#"<label>Avatar URL <input name="avatar_url" value="{avatar_url}"></label>"#,
            r#"<label>Page title <input name="custom_title" value="{custom_title}" placeholder="{default_title}"></label>"#,
            r#"<button type="submit">Save</button></form>"#,
        ),
        action = escape(&profile.edit_path()),
        full_name = escape(&profile.full_name),
        bio = escape(&profile.bio),
        avatar_url = escape(&profile.avatar_url),
        custom_title = escape(profile.custom_title.as_deref().unwrap_or_default()),
        default_title = escape(&format!("{} (@{})", profile.display_name(), profile.username)),
    );
    editor_page("Edit profile", &owner, &query.notifier(), &body)
}

/// POST /edit-profile/{username}
async fn save_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(username): Path<String>,
    Form(form): Form<ProfileForm>,
) -> Response {
    let owner = match editable_profile(&state, &session, Some(&username)).await {
        Ok(owner) => owner,
        Err(resp) => return resp,
    };
    let patch = ProfilePatch {
        full_name: Some(form.full_name.trim().to_string()),
        bio: Some(form.bio.trim().to_string()),
        avatar_url: Some(form.avatar_url.trim().to_string()),
        custom_title: Some(form.custom_title.trim().to_string()),
    };
    if let Err(e) = state
        .backend
        .update_profile(&session.access_token, &owner.profile.id, &patch)
        .await
    {
        return save_failed(e);
    }
    info!(profile_id = %owner.profile.id, "Profile updated");
    saved_redirect(&owner.profile.edit_path())
}

// ── Appearance ──────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct AppearanceForm {
    #[serde(default)]
    theme_id: String,
    #[serde(default)]
    font_style: String,
    #[serde(default)]
    layout_type: String,
    /// Checkbox: present when ticked.
    #[serde(default)]
    dark_mode: Option<String>,
    #[serde(default)]
    background_url: String,
}

impl AppearanceForm {
    fn into_patch(self) -> SettingsPatch {
        let font = FONTS
            .iter()
            .find(|(id, _, _)| *id == self.font_style)
            .map(|(id, _, _)| *id)
            .unwrap_or(FONTS[0].0);
        let background_url = self.background_url.trim();
        let background = if background_url.is_empty() {
            background_value(None)
        } else {
            background_value(Some(&BackgroundStyle {
                id: "custom".to_string(),
                url: format_url(background_url),
            }))
        };
        SettingsPatch {
            theme_id: Some(resolve_theme(&self.theme_id).id.to_string()),
            is_dark_mode: Some(self.dark_mode.is_some()),
            font_style: Some(font.to_string()),
            layout_type: Some(LayoutType::parse(Some(&self.layout_type)).as_str().to_string()),
            background_style: Some(background),
            ..Default::default()
        }
    }
}

/// GET /appearance
async fn appearance_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<SavedQuery>,
) -> Response {
    let owner = match load_owner(&state, &session).await {
        Ok(owner) => owner,
        Err(resp) => return resp,
    };
    let settings = &owner.settings;
    let background_url = settings.background_image().map(|b| b.url.as_str()).unwrap_or_default();
    let body = format!(
        concat!(
            "<h1>Appearance</h1>",
            r#"<form class="stack" method="post" action="/appearance">"#,
            r#"<label>Theme <select name="theme_id">{themes}</select></label>"#,
            r#"<label>Font <select name="font_style">{fonts}</select></label>"#,
            r#"<label>Layout <select name="layout_type">{layouts}</select></label>"#,
            r#"<label><span><input type="checkbox" name="dark_mode" value="on"{dark}> Dark mode</span></label>"#,
            r#"<label>Background image URL <input name="background_url" value="{background}" placeholder="Leave empty to use the theme"></label>"#,
            r#"<button type="submit">Save</button></form>"#,
        ),
        themes = options(THEMES.iter().map(|t| (t.id, t.label)), &settings.theme_id),
        fonts = options(FONTS.iter().map(|(id, label, _)| (*id, *label)), &settings.font_style),
        layouts = options(
            LayoutType::ALL.iter().map(|l| (l.as_str(), l.as_str())),
            settings.layout_type.as_str()
        ),
        dark = if settings.is_dark_mode { " checked" } else { "" },
        background = escape(background_url),
    );
    editor_page("Appearance", &owner, &query.notifier(), &body)
}

/// POST /appearance
async fn save_appearance(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<AppearanceForm>,
) -> Response {
    let patch = form.into_patch();
    if let Err(e) = state
        .backend
        .update_settings(&session.access_token, session.user_id(), &patch)
        .await
    {
        return save_failed(e);
    }
    info!(profile_id = session.user_id(), "Appearance updated");
    saved_redirect("/appearance")
}

// ── Links ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LinkForm {
    action: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    display: String,
    #[serde(default)]
    photo_url: String,
}

impl LinkForm {
    fn into_edit(self) -> Result<LinkEdit, &'static str> {
        match self.action.as_str() {
            "add" => {
                if self.url.trim().is_empty() {
                    return Err("A link needs a URL.");
                }
                Ok(LinkEdit::Add(Link::new(
                    self.title.trim(),
                    self.url.trim(),
                    self.icon.trim(),
                    DisplayMode::parse(Some(&self.display)),
                    self.photo_url.trim(),
                )))
            }
            "remove" => Ok(LinkEdit::Remove(self.id)),
            "up" => Ok(LinkEdit::MoveUp(self.id)),
            "down" => Ok(LinkEdit::MoveDown(self.id)),
            _ => Err("Unknown link action."),
        }
    }
}

fn link_row(link: &Link) -> String {
    let button = |action: &str, label: &str| {
        format!(
            r#"<form class="inline" method="post" action="/edit-links"><input type="hidden" name="action" value="{}"><input type="hidden" name="id" value="{}"><button type="submit">{}</button></form>"#,
            action,
            escape(&link.id),
            label
        )
    };
    format!(
        "<li><strong>{}</strong> <a href=\"{}\">{}</a> {}{}{}</li>",
        escape(&link.title),
        escape(&link.url),
        escape(&link.url),
        button("up", "↑"),
        button("down", "↓"),
        button("remove", "Remove"),
    )
}

/// GET /edit-links
async fn links_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<SavedQuery>,
) -> Response {
    let owner = match load_owner(&state, &session).await {
        Ok(owner) => owner,
        Err(resp) => return resp,
    };
    let rows: String = owner.settings.links.iter().map(link_row).collect();
    let displays = [DisplayMode::Both, DisplayMode::Title, DisplayMode::Icon];
    let body = format!(
        concat!(
            "<h1>Links</h1><ol class=\"link-editor\">{rows}</ol>",
            "<h2>Add a link</h2>",
            r#"<form class="stack" method="post" action="/edit-links"><input type="hidden" name="action" value="add">"#,
            r#"<label>Title <input name="title"></label>"#,
            r#"<label>URL <input name="url" required></label>"#,
            r#"<label>Icon <select name="icon">{icons}</select></label>"#,
            r#"<label>Show <select name="display">{displays}</select></label>"#,
            r#"<label>Photo URL <input name="photo_url"></label>"#,
            r#"<button type="submit">Add</button></form>"#,
        ),
        rows = rows,
        icons = options(ICONS.iter().map(|(id, _)| (*id, *id)), "link"),
        displays = options(displays.iter().map(|d| (d.as_str(), d.as_str())), "both"),
    );
    editor_page("Links", &owner, &query.notifier(), &body)
}

/// POST /edit-links
async fn save_links(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<LinkForm>,
) -> Response {
    let edit = match form.into_edit() {
        Ok(edit) => edit,
        Err(message) => return rejected(StatusCode::BAD_REQUEST, "Could not update links", message),
    };
    let mut owner = match load_owner(&state, &session).await {
        Ok(owner) => owner,
        Err(resp) => return resp,
    };
    if !apply_edit(&mut owner.settings.links, edit) {
        return Redirect::to("/edit-links").into_response();
    }

    let patch = SettingsPatch {
        links: Some(links_value(&owner.settings.links)),
        ..Default::default()
    };
    if let Err(e) = state
        .backend
        .update_settings(&session.access_token, &owner.profile.id, &patch)
        .await
    {
        return save_failed(e);
    }
    info!(profile_id = %owner.profile.id, links = owner.settings.links.len(), "Links updated");
    saved_redirect("/edit-links")
}

// ── Settings ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    favicon_url: String,
}

/// GET /settings
async fn settings_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<SavedQuery>,
) -> Response {
    let owner = match load_owner(&state, &session).await {
        Ok(owner) => owner,
        Err(resp) => return resp,
    };
    let body = format!(
        concat!(
            "<h1>Settings</h1>",
            r#"<form class="stack" method="post" action="/settings">"#,
            r#"<label>Favicon URL <input name="favicon_url" value="{favicon}"></label>"#,
            r#"<button type="submit">Save</button></form>"#,
            "<h2>Session</h2><p>Signed in as {email}.</p>",
            r#"<form method="post" action="/auth/logout"><button type="submit">Sign out</button></form>"#,
        ),
        favicon = escape(owner.settings.favicon_url.as_deref().unwrap_or_default()),
        email = escape(session.claims.email.as_deref().unwrap_or(&owner.profile.username)),
    );
    editor_page("Settings", &owner, &query.notifier(), &body)
}

/// POST /settings
async fn save_settings(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<SettingsForm>,
) -> Response {
    let patch = SettingsPatch {
        favicon_url: Some(form.favicon_url.trim().to_string()),
        ..Default::default()
    };
    if let Err(e) = state
        .backend
        .update_settings(&session.access_token, session.user_id(), &patch)
        .await
    {
        return save_failed(e);
    }
    saved_redirect("/settings")
}
