use serde::{Deserialize, Serialize};

use super::link::Link;

pub const DEFAULT_THEME: &str = "elegant";
pub const DEFAULT_FONT: &str = "sans";

/// Sentinel background id meaning "no image, use the theme".
pub const NO_BACKGROUND: &str = "none";

/// How the link list is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutType {
    #[default]
    Links,
    Mixed,
    Bento,
}

impl LayoutType {
    pub const ALL: [LayoutType; 3] = [LayoutType::Links, LayoutType::Mixed, LayoutType::Bento];

    /// Parse a stored value; unknown or absent values select `Links`.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("mixed") => LayoutType::Mixed,
            Some("bento") => LayoutType::Bento,
            _ => LayoutType::Links,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutType::Links => "links",
            LayoutType::Mixed => "mixed",
            LayoutType::Bento => "bento",
        }
    }
}

/// Optional image replacing the theme background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundStyle {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: String,
}

impl BackgroundStyle {
    pub fn none() -> Self {
        Self {
            id: NO_BACKGROUND.to_string(),
            url: String::new(),
        }
    }

    /// True when this style actually overrides the theme.
    pub fn is_image(&self) -> bool {
        self.id != NO_BACKGROUND && !self.url.is_empty()
    }
}

/// Display configuration of one profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSettings {
    /// Display order.
    pub links: Vec<Link>,
    pub theme_id: String,
    pub is_dark_mode: bool,
    pub font_style: String,
    pub layout_type: LayoutType,
    pub background_style: Option<BackgroundStyle>,
    pub favicon_url: Option<String>,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            links: Vec::new(),
            theme_id: DEFAULT_THEME.to_string(),
            is_dark_mode: false,
            font_style: DEFAULT_FONT.to_string(),
            layout_type: LayoutType::Links,
            background_style: None,
            favicon_url: None,
        }
    }
}

impl ProfileSettings {
    /// The background override, when it is a real image.
    pub fn background_image(&self) -> Option<&BackgroundStyle> {
        self.background_style.as_ref().filter(|b| b.is_image())
    }
}
