//! The public profile page.
//!
//! A [`ProfilePage`] moves from `Loading` to exactly one terminal state.
//! Each load is tagged with a [`LoadTicket`]; a result carrying an older
//! ticket than the page's current generation is dropped, so a slow load
//! can never overwrite a newer one.

use axum::http::StatusCode;
use linkbio_core::html::{PageHead, escape, render_page};
use linkbio_core::{DocumentRoot, Notifier};
use tracing::debug;

use crate::layout::render_links;
use crate::loader::{LoadError, LoadedProfile};
use crate::model::ProfileSettings;
use crate::theme::{Theme, font_family, resolve_theme};
use crate::url::path_segment;

#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    Loading,
    Success(LoadedProfile),
    Error(LoadError),
}

/// Identifies one load started by [`ProfilePage::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Where the page background comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedBackground {
    Image(String),
    Theme(&'static Theme),
}

impl ResolvedBackground {
    /// Image backgrounds are dimmed so text stays readable.
    pub fn has_overlay(&self) -> bool {
        matches!(self, ResolvedBackground::Image(_))
    }

    pub fn text_shadow(&self) -> bool {
        self.has_overlay()
    }

    fn css(&self) -> String {
        match self {
            ResolvedBackground::Image(url) => format!("background-image: url('{}');", css_url(url)),
            ResolvedBackground::Theme(theme) => format!("background: {};", theme.background),
        }
    }
}

/// Keep a URL from breaking out of a quoted CSS `url('...')`.
fn css_url(url: &str) -> String {
    url.chars()
        .filter(|c| !matches!(c, '\'' | '"' | '\\' | '(' | ')' | '\n' | '\r'))
        .collect()
}

/// A usable background override wins over the theme.
pub fn resolve_background(settings: &ProfileSettings) -> ResolvedBackground {
    match settings.background_image() {
        Some(style) => ResolvedBackground::Image(style.url.clone()),
        None => ResolvedBackground::Theme(resolve_theme(&settings.theme_id)),
    }
}

/// Editor path for `username`. Without one, a destructive toast is
/// pushed and there is nowhere to go.
pub fn edit_profile_target(username: Option<&str>, notifier: &mut Notifier) -> Option<String> {
    match username.map(str::trim).filter(|u| !u.is_empty()) {
        Some(username) => Some(format!("/edit-profile/{}", path_segment(username))),
        None => {
            notifier.destructive("Cannot edit profile", "No username is associated with this profile.");
            None
        }
    }
}

#[derive(Debug)]
pub struct ProfilePage {
    state: PageState,
    generation: u64,
    notifier: Notifier,
    document: DocumentRoot,
    /// Profile id of the signed-in visitor, if any.
    viewer: Option<String>,
}

impl Default for ProfilePage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfilePage {
    pub fn new() -> Self {
        Self {
            state: PageState::Loading,
            generation: 0,
            notifier: Notifier::new(),
            document: DocumentRoot::new(),
            viewer: None,
        }
    }

    pub fn with_viewer(mut self, viewer: Option<String>) -> Self {
        self.viewer = viewer;
        self
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn document(&self) -> &DocumentRoot {
        &self.document
    }

    /// Start a new load. Any ticket issued earlier becomes stale.
    pub fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = PageState::Loading;
        LoadTicket(self.generation)
    }

    /// Apply a load result. Returns `false` when it was discarded.
    pub fn commit(&mut self, ticket: LoadTicket, result: Result<LoadedProfile, LoadError>) -> bool {
        if ticket.0 != self.generation {
            debug!(ticket = ticket.0, current = self.generation, "discarding stale profile load");
            return false;
        }
        if self.state != PageState::Loading {
            debug!(ticket = ticket.0, "profile load already committed");
            return false;
        }
        self.state = match result {
            Ok(loaded) => PageState::Success(loaded),
            Err(e) => {
                if let Some(toast) = e.notification() {
                    self.notifier.push(toast);
                }
                PageState::Error(e)
            }
        };
        true
    }

    /// Background of the loaded profile; `None` until a load succeeded.
    pub fn background(&self) -> Option<ResolvedBackground> {
        match &self.state {
            PageState::Success(loaded) => Some(resolve_background(&loaded.settings)),
            _ => None,
        }
    }

    /// Editor path for the loaded profile.
    pub fn edit_profile_target(&mut self) -> Option<String> {
        let username = match &self.state {
            PageState::Success(loaded) => Some(loaded.profile.username.clone()),
            _ => None,
        };
        edit_profile_target(username.as_deref(), &mut self.notifier)
    }

    fn is_owner(&self, loaded: &LoadedProfile) -> bool {
        self.viewer.as_deref() == Some(loaded.profile.id.as_str())
    }

    /// Status and full HTML document for the current state.
    pub fn render(&self) -> (StatusCode, String) {
        match &self.state {
            PageState::Loading => {
                let head = PageHead { title: "Loading…", favicon: None };
                let body = r#"<div class="state-loading" role="status">Loading profile…</div>"#;
                (StatusCode::OK, render_page(&head, &self.document, &self.notifier, body))
            }
            PageState::Error(e) => {
                let (title, body) = if e.is_not_found() {
                    (
                        "Profile not found",
                        concat!(
                            r#"<div class="state-not-found"><h1>Profile not found</h1>"#,
                            r#"<p>This profile does not exist or was removed.</p>"#,
                            r#"<a href="/">Go home</a></div>"#,
                        ),
                    )
                } else {
                    (
                        "Something went wrong",
                        concat!(
                            r#"<div class="state-error"><h1>Something went wrong</h1>"#,
                            r#"<p>This profile could not be loaded right now.</p>"#,
                            r#"<a href="/">Go home</a></div>"#,
                        ),
                    )
                };
                let head = PageHead { title, favicon: None };
                (e.status_code(), render_page(&head, &self.document, &self.notifier, body))
            }
            PageState::Success(loaded) => {
                let settings = &loaded.settings;
                // Held until the document is rendered, reverted on drop.
                let _style = self
                    .document
                    .apply_style(settings.is_dark_mode, font_family(&settings.font_style));

                let title = loaded.profile.page_title();
                let head = PageHead {
                    title: &title,
                    favicon: settings.favicon_url.as_deref(),
                };
                let body = self.render_profile(loaded);
                (StatusCode::OK, render_page(&head, &self.document, &self.notifier, &body))
            }
        }
    }

    fn render_profile(&self, loaded: &LoadedProfile) -> String {
        let profile = &loaded.profile;
        let settings = &loaded.settings;
        let background = resolve_background(settings);

        let overlay = if background.has_overlay() {
            r#"<div class="profile-overlay"></div>"#
        } else {
            ""
        };
        let content_class = if background.text_shadow() {
            "profile-content text-shadow"
        } else {
            "profile-content"
        };
        let avatar = if profile.avatar_url.is_empty() {
            String::new()
        } else {
            format!(
                r#"<img class="avatar" src="{}" alt="{}">"#,
                escape(&profile.avatar_url),
                escape(profile.display_name())
            )
        };
        let bio = if profile.bio.is_empty() {
            String::new()
        } else {
            format!("<p>{}</p>", escape(&profile.bio))
        };
        let edit = if self.is_owner(loaded) {
            format!(
                r#"<p><a class="edit-link" href="{}">Edit profile</a></p>"#,
                escape(&profile.edit_path())
            )
        } else {
            String::new()
        };

        format!(
            concat!(
                r#"<div class="profile-page" data-theme="{theme}" style="{bg}">{overlay}"#,
                r#"<main class="{content}">{avatar}<h1>{name}</h1><p class="handle">@{username}</p>{bio}"#,
                "{links}{edit}</main></div>",
            ),
            theme = escape(&settings.theme_id),
            bg = escape(&background.css()),
            overlay = overlay,
            content = content_class,
            avatar = avatar,
            name = escape(profile.display_name()),
            username = escape(&profile.username),
            bio = bio,
            links = render_links(settings.layout_type, &settings.links, background.text_shadow()),
            edit = edit,
        )
    }
}

#[cfg(test)]
mod tests {
    use linkbio_core::ToastVariant;
    use linkbio_core::document::{DARK_CLASS, FONT_PROPERTY};

    use super::*;
    use crate::model::{BackgroundStyle, Profile};

    fn loaded() -> LoadedProfile {
        LoadedProfile {
            profile: Profile {
                id: "p-ada".into(),
                username: "ada".into(),
                full_name: "Ada".into(),
                bio: "hello".into(),
                avatar_url: String::new(),
                custom_title: None,
            },
            settings: ProfileSettings {
                is_dark_mode: true,
                font_style: "serif".into(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn stale_ticket_is_discarded() {
        let mut page = ProfilePage::new();
        let first = page.begin();
        let second = page.begin();

        assert!(!page.commit(first, Err(LoadError::Backend("late".into()))));
        assert_eq!(page.state(), &PageState::Loading);
        assert!(page.notifier().is_empty());

        assert!(page.commit(second, Ok(loaded())));
        assert!(matches!(page.state(), PageState::Success(_)));
    }

    #[test]
    fn terminal_state_is_not_overwritten() {
        let mut page = ProfilePage::new();
        let ticket = page.begin();
        assert!(page.commit(ticket, Ok(loaded())));
        assert!(!page.commit(ticket, Err(LoadError::NotFound("ada".into()))));
        assert!(matches!(page.state(), PageState::Success(_)));
    }

    #[test]
    fn error_commit_fires_notification() {
        let mut page = ProfilePage::new();
        let ticket = page.begin();
        page.commit(ticket, Err(LoadError::NotFound("zed".into())));
        assert!(page.notifier().fired(ToastVariant::Error));

        let mut page = ProfilePage::new();
        let ticket = page.begin();
        page.commit(ticket, Err(LoadError::SettingsMissing("p1".into())));
        assert!(page.notifier().is_empty());
        let (status, html) = page.render();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains(r#"class="state-error""#));
    }

    #[test]
    fn background_none_uses_theme() {
        let mut settings = ProfileSettings {
            theme_id: "sunset".into(),
            background_style: Some(BackgroundStyle::none()),
            ..Default::default()
        };
        let bg = resolve_background(&settings);
        assert_eq!(bg, ResolvedBackground::Theme(resolve_theme("sunset")));
        assert!(!bg.has_overlay() && !bg.text_shadow());

        settings.background_style = Some(BackgroundStyle { id: "custom".into(), url: "https://img/bg.jpg".into() });
        let bg = resolve_background(&settings);
        assert_eq!(bg, ResolvedBackground::Image("https://img/bg.jpg".into()));
        assert!(bg.has_overlay() && bg.text_shadow());
    }

    #[test]
    fn style_context_lives_only_for_render() {
        let mut page = ProfilePage::new();
        let ticket = page.begin();
        page.commit(ticket, Ok(loaded()));

        let (status, html) = page.render();
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"<html lang="en" class="dark""#));
        assert!(html.contains("--font-family: ui-serif"));
        assert!(html.contains("<title>Ada (@ada)</title>"));

        assert!(!page.document().has_class(DARK_CLASS));
        assert_eq!(page.document().property(FONT_PROPERTY), None);
    }

    #[test]
    fn image_background_renders_overlay() {
        let mut data = loaded();
        data.settings.background_style = Some(BackgroundStyle { id: "custom".into(), url: "https://img/bg.jpg".into() });
        let mut page = ProfilePage::new();
        let ticket = page.begin();
        assert_eq!(page.background(), None);
        page.commit(ticket, Ok(data));
        assert!(page.background().is_some_and(|bg| bg.has_overlay()));
        let (_, html) = page.render();
        assert!(html.contains(r#"class="profile-overlay""#));
        assert!(html.contains("profile-content text-shadow"));
        assert!(html.contains("url(&#39;https://img/bg.jpg&#39;)"));
    }

    #[test]
    fn edit_target_requires_username() {
        let mut page = ProfilePage::new();
        assert_eq!(page.edit_profile_target(), None);
        assert!(page.notifier().fired(ToastVariant::Destructive));

        let mut page = ProfilePage::new();
        let ticket = page.begin();
        page.commit(ticket, Ok(loaded()));
        assert_eq!(page.edit_profile_target().as_deref(), Some("/edit-profile/ada"));
        assert!(page.notifier().is_empty());
    }

    #[test]
    fn owner_sees_edit_link() {
        let mut page = ProfilePage::new().with_viewer(Some("p-ada".into()));
        let ticket = page.begin();
        page.commit(ticket, Ok(loaded()));
        assert!(page.render().1.contains(r#"href="/edit-profile/ada""#));

        let mut page = ProfilePage::new().with_viewer(Some("p-other".into()));
        let ticket = page.begin();
        page.commit(ticket, Ok(loaded()));
        assert!(!page.render().1.contains(r#"class="edit-link""#));
    }
}
