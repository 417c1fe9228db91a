use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::url::format_url;

/// Icon shown when a link does not name one.
pub const DEFAULT_ICON: &str = "link";

/// What a link button shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Title,
    Icon,
    #[default]
    Both,
}

impl DisplayMode {
    /// Parse a stored value; anything unrecognised shows both.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("title") | Some("title-only") | Some("title_only") => DisplayMode::Title,
            Some("icon") | Some("icon-only") | Some("icon_only") => DisplayMode::Icon,
            _ => DisplayMode::Both,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Title => "title",
            DisplayMode::Icon => "icon",
            DisplayMode::Both => "both",
        }
    }

    pub fn shows_title(&self) -> bool {
        matches!(self, DisplayMode::Title | DisplayMode::Both)
    }

    pub fn shows_icon(&self) -> bool {
        matches!(self, DisplayMode::Icon | DisplayMode::Both)
    }
}

/// A clickable entry on a profile page. `url` is always normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub id: String,
    pub title: String,
    pub url: String,
    pub icon: String,
    pub display: DisplayMode,
    pub photo_url: String,
}

/// A link entry as stored. Each field is read on its own: a missing or
/// non-string value falls back to that field's default.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawLink {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub display: Option<String>,
    #[serde(default, alias = "photoUrl", deserialize_with = "lenient_string")]
    pub photo_url: Option<String>,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl Link {
    /// A fresh link with a generated id.
    pub fn new(title: &str, url: &str, icon: &str, display: DisplayMode, photo_url: &str) -> Self {
        Self::from_raw(RawLink {
            id: None,
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            icon: Some(icon.to_string()),
            display: Some(display.as_str().to_string()),
            photo_url: Some(photo_url.to_string()),
        })
    }

    pub(crate) fn from_raw(raw: RawLink) -> Self {
        Self {
            id: non_empty(raw.id).unwrap_or_else(linkbio_core::new_id),
            title: raw.title.unwrap_or_default(),
            url: format_url(raw.url.as_deref().unwrap_or_default().trim()),
            icon: non_empty(raw.icon).unwrap_or_else(|| DEFAULT_ICON.to_string()),
            display: DisplayMode::parse(raw.display.as_deref()),
            photo_url: raw.photo_url.unwrap_or_default(),
        }
    }

    pub fn has_photo(&self) -> bool {
        !self.photo_url.is_empty()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// An edit to an ordered link list.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEdit {
    Add(Link),
    Remove(String),
    MoveUp(String),
    MoveDown(String),
}

/// Apply an edit in place. Returns `false` when nothing changed
/// (unknown id, or moving past either end).
pub fn apply_edit(links: &mut Vec<Link>, edit: LinkEdit) -> bool {
    let position = |links: &[Link], id: &str| links.iter().position(|l| l.id == id);
    match edit {
        LinkEdit::Add(link) => {
            links.push(link);
            true
        }
        LinkEdit::Remove(id) => match position(links, &id) {
            Some(i) => {
                links.remove(i);
                true
            }
            None => false,
        },
        LinkEdit::MoveUp(id) => match position(links, &id) {
            Some(i) if i > 0 => {
                links.swap(i, i - 1);
                true
            }
            _ => false,
        },
        LinkEdit::MoveDown(id) => match position(links, &id) {
            Some(i) if i + 1 < links.len() => {
                links.swap(i, i + 1);
                true
            }
            _ => false,
        },
    }
}
