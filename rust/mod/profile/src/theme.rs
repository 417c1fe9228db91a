//! Built-in page themes and font stacks.

use serde::Serialize;

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub id: &'static str,
    pub label: &'static str,
    /// CSS `background` value.
    pub background: &'static str,
}

pub const FALLBACK_THEME: &str = "elegant";

pub static THEMES: [Theme; 4] = [
    Theme {
        id: "elegant",
        label: "Elegant",
        background: "linear-gradient(135deg, #f5f3ff 0%, #e0e7ff 50%, #fce7f3 100%)",
    },
    Theme {
        id: "sunset",
        label: "Sunset",
        background: "linear-gradient(135deg, #fb923c 0%, #f43f5e 55%, #a855f7 100%)",
    },
    Theme {
        id: "ocean",
        label: "Ocean",
        background: "linear-gradient(135deg, #0ea5e9 0%, #2563eb 50%, #1e3a8a 100%)",
    },
    Theme {
        id: "midnight",
        label: "Midnight",
        background: "linear-gradient(135deg, #0f172a 0%, #1e1b4b 60%, #312e81 100%)",
    },
];

/// Look up a theme; unknown ids get the fallback theme.
pub fn resolve_theme(id: &str) -> &'static Theme {
    THEMES
        .iter()
        .find(|t| t.id == id)
        .unwrap_or(&THEMES[0])
}

/// Selectable font styles: id, label, CSS font stack.
pub static FONTS: [(&str, &str, &str); 3] = [
    ("sans", "Sans", "ui-sans-serif, system-ui, sans-serif"),
    ("serif", "Serif", "ui-serif, Georgia, serif"),
    ("mono", "Mono", "ui-monospace, SFMono-Regular, monospace"),
];

/// CSS font stack for a font style id; unknown ids use sans.
pub fn font_family(id: &str) -> &'static str {
    FONTS
        .iter()
        .find(|(fid, _, _)| *fid == id)
        .map(|(_, _, stack)| *stack)
        .unwrap_or(FONTS[0].2)
}
