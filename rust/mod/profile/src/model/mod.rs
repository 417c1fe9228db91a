//! Canonical profile types and the strict parse step from backend rows.
//!
//! Rows arrive loosely typed. [`parse_profile`] rejects rows missing their
//! identity; [`parse_settings`] never fails and fills defaults, dropping
//! malformed links and background overrides with a warning.

pub mod link;
pub mod profile;
pub mod settings;

pub use link::{DisplayMode, Link, LinkEdit, apply_edit};
pub use profile::Profile;
pub use settings::{BackgroundStyle, LayoutType, ProfileSettings};

use linkbio_backend::{ProfileRow, SettingsRow};
use serde_json::Value;
use tracing::warn;

use link::RawLink;
use settings::{DEFAULT_FONT, DEFAULT_THEME};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("profile row is missing `{0}`")]
    MissingField(&'static str),
}

fn required(value: Option<String>, field: &'static str) -> Result<String, RowError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(RowError::MissingField(field))
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub fn parse_profile(row: ProfileRow) -> Result<Profile, RowError> {
    Ok(Profile {
        id: required(row.id, "id")?,
        username: required(row.username, "username")?,
        full_name: row.full_name.unwrap_or_default(),
        bio: row.bio.unwrap_or_default(),
        avatar_url: row.avatar_url.unwrap_or_default(),
        custom_title: row.custom_title.filter(|t| !t.trim().is_empty()),
    })
}

pub fn parse_settings(row: SettingsRow) -> ProfileSettings {
    ProfileSettings {
        links: parse_links(row.links),
        theme_id: or_default(row.theme_id, DEFAULT_THEME),
        is_dark_mode: row.is_dark_mode.unwrap_or(false),
        font_style: or_default(row.font_style, DEFAULT_FONT),
        layout_type: LayoutType::parse(row.layout_type.as_deref()),
        background_style: row.background_style.and_then(parse_background),
        favicon_url: row.favicon_url.filter(|f| !f.trim().is_empty()),
    }
}

/// A JSON column may hold the value itself or its serialized text.
fn unwrap_embedded(value: Value, column: &str) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => match serde_json::from_str(&s) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(column, "ignoring unparseable column: {}", e);
                None
            }
        },
        other => Some(other),
    }
}

fn parse_links(value: Option<Value>) -> Vec<Link> {
    let Some(value) = value.and_then(|v| unwrap_embedded(v, "links")) else {
        return Vec::new();
    };
    let Value::Array(entries) = value else {
        warn!("links column is not an array, showing none");
        return Vec::new();
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            if !entry.is_object() {
                warn!(index, "skipping link entry that is not an object");
                return None;
            }
            match serde_json::from_value::<RawLink>(entry) {
                Ok(raw) => Some(Link::from_raw(raw)),
                Err(e) => {
                    warn!(index, "skipping malformed link entry: {}", e);
                    None
                }
            }
        })
        .collect()
}

fn parse_background(value: Value) -> Option<BackgroundStyle> {
    let value = unwrap_embedded(value, "background_style")?;
    match serde_json::from_value::<BackgroundStyle>(value) {
        Ok(style) => Some(style),
        Err(e) => {
            warn!("ignoring malformed background_style: {}", e);
            None
        }
    }
}

/// Column value for writing a link list back.
pub fn links_value(links: &[Link]) -> Value {
    Value::Array(
        links
            .iter()
            .map(|l| {
                serde_json::json!({
                    "id": l.id,
                    "title": l.title,
                    "url": l.url,
                    "icon": l.icon,
                    "display": l.display.as_str(),
                    "photo_url": l.photo_url,
                })
            })
            .collect(),
    )
}

/// Column value for a background override; `None` clears it.
pub fn background_value(style: Option<&BackgroundStyle>) -> Value {
    match style {
        Some(s) => serde_json::json!({ "id": s.id, "url": s.url }),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(links: Value) -> SettingsRow {
        SettingsRow {
            id: Some("p1".into()),
            links: Some(links),
            ..Default::default()
        }
    }

    #[test]
    fn profile_requires_id_and_username() {
        let ok = parse_profile(ProfileRow {
            id: Some("p1".into()),
            username: Some("ada".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ok.full_name, "");
        assert_eq!(ok.custom_title, None);

        let err = parse_profile(ProfileRow { username: Some("ada".into()), ..Default::default() });
        assert_eq!(err, Err(RowError::MissingField("id")));

        let err = parse_profile(ProfileRow {
            id: Some("p1".into()),
            username: Some(" ".into()),
            ..Default::default()
        });
        assert_eq!(err, Err(RowError::MissingField("username")));
    }

    #[test]
    fn settings_defaults_when_columns_absent() {
        let s = parse_settings(SettingsRow { id: Some("p1".into()), ..Default::default() });
        assert_eq!(s.theme_id, "elegant");
        assert_eq!(s.layout_type, LayoutType::Links);
        assert_eq!(s.font_style, "sans");
        assert!(!s.is_dark_mode);
        assert!(s.links.is_empty());
        assert_eq!(s.background_style, None);
        assert_eq!(s.favicon_url, None);
    }

    #[test]
    fn links_are_normalized_in_order() {
        let s = parse_settings(row(json!([
            {"id": "a", "title": "Site", "url": "example.com"},
            {"url": "//cdn.example/x", "display": "title", "photoUrl": "https://img/p.png"},
        ])));
        assert_eq!(s.links.len(), 2);
        assert_eq!(s.links[0].id, "a");
        assert_eq!(s.links[0].url, "https://example.com");
        assert_eq!(s.links[0].icon, "link");
        assert_eq!(s.links[0].display, DisplayMode::Both);
        assert_eq!(s.links[1].url, "https://cdn.example/x");
        assert_eq!(s.links[1].title, "");
        assert_eq!(s.links[1].display, DisplayMode::Title);
        assert_eq!(s.links[1].photo_url, "https://img/p.png");
        assert!(!s.links[1].id.is_empty());
    }

    #[test]
    fn links_from_serialized_string() {
        let s = parse_settings(row(json!(r#"[{"id":"x","url":"http://a.b"}]"#)));
        assert_eq!(s.links.len(), 1);
        assert_eq!(s.links[0].url, "http://a.b");
    }

    #[test]
    fn non_object_link_entries_are_skipped() {
        let s = parse_settings(row(json!([42, "nope", {"id": "ok", "url": "x.y"}, {"id": 7, "url": "x.com"}])));
        assert_eq!(s.links.len(), 2);
        assert_eq!(s.links[0].id, "ok");
        // A bad id costs the id, not the link.
        assert_ne!(s.links[1].id, "7");
        assert_eq!(s.links[1].url, "https://x.com");

        let s = parse_settings(row(json!("{not json")));
        assert!(s.links.is_empty());
        let s = parse_settings(row(json!({"id": "x"})));
        assert!(s.links.is_empty());
    }

    #[test]
    fn background_from_string_or_object() {
        let mut r = row(json!([]));
        r.background_style = Some(json!(r#"{"id":"custom","url":"https://img/bg.jpg"}"#));
        let bg = parse_settings(r).background_style.unwrap();
        assert_eq!(bg.url, "https://img/bg.jpg");
        assert!(bg.is_image());

        let mut r = row(json!([]));
        r.background_style = Some(json!({"id": "none", "url": ""}));
        let s = parse_settings(r);
        assert_eq!(s.background_style, Some(BackgroundStyle::none()));
        assert!(s.background_image().is_none());
    }

    #[test]
    fn unparseable_background_is_dropped() {
        let mut r = row(json!([]));
        r.background_style = Some(json!("{broken"));
        r.theme_id = Some("ocean".into());
        let s = parse_settings(r);
        assert_eq!(s.background_style, None);
        assert_eq!(s.theme_id, "ocean");
    }

    #[test]
    fn written_links_parse_back_unchanged() {
        let links = vec![Link::new("Blog", "blog.example", "globe", DisplayMode::Icon, "")];
        let s = parse_settings(row(links_value(&links)));
        assert_eq!(s.links, links);
        assert_eq!(background_value(None), Value::Null);
    }
}
