//! Link list renderers, one per [`LayoutType`].

use linkbio_core::html::escape;

use crate::model::{Link, LayoutType};

/// Icon ids offered in the editor, with the glyph rendered for each.
pub static ICONS: [(&str, &str); 8] = [
    ("link", "🔗"),
    ("globe", "🌐"),
    ("mail", "✉️"),
    ("phone", "📞"),
    ("camera", "📷"),
    ("music", "🎵"),
    ("video", "▶️"),
    ("cart", "🛒"),
];

fn icon_glyph(id: &str) -> &'static str {
    ICONS
        .iter()
        .find(|(icon, _)| *icon == id)
        .map(|(_, glyph)| *glyph)
        .unwrap_or(ICONS[0].1)
}

/// Render the link list with exactly one layout.
pub fn render_links(layout: LayoutType, links: &[Link], text_shadow: bool) -> String {
    if links.is_empty() {
        return r#"<p class="links-empty">No links yet.</p>"#.to_string();
    }
    match layout {
        LayoutType::Links => render_list(links, text_shadow),
        LayoutType::Mixed => render_mixed(links, text_shadow),
        LayoutType::Bento => render_bento(links, text_shadow),
    }
}

/// Icon and/or title, as the link's display mode asks.
fn label(link: &Link) -> String {
    let mut out = String::new();
    if link.display.shows_icon() {
        out.push_str(&format!(
            r#"<i class="icon" data-icon="{}" aria-hidden="true">{}</i>"#,
            escape(&link.icon),
            icon_glyph(&link.icon)
        ));
    }
    if link.display.shows_title() {
        out.push_str(&format!("<span>{}</span>", escape(&link.title)));
    }
    out
}

fn anchor_open(link: &Link, class: &str) -> String {
    format!(
        r#"<a class="{}" href="{}" target="_blank" rel="noopener noreferrer" aria-label="{}">"#,
        class,
        escape(&link.url),
        escape(&link.title)
    )
}

fn photo(link: &Link) -> String {
    format!(r#"<img class="link-photo" src="{}" alt="">"#, escape(&link.photo_url))
}

fn list_class(base: &str, text_shadow: bool) -> String {
    if text_shadow {
        format!("{} text-shadow", base)
    } else {
        base.to_string()
    }
}

fn render_list(links: &[Link], text_shadow: bool) -> String {
    let items: String = links
        .iter()
        .map(|link| format!("<li>{}{}</a></li>", anchor_open(link, "link-button"), label(link)))
        .collect();
    format!(r#"<ul class="{}">{}</ul>"#, list_class("layout-links", text_shadow), items)
}

/// Buttons, except links with a photo which become cards.
fn render_mixed(links: &[Link], text_shadow: bool) -> String {
    let items: String = links
        .iter()
        .map(|link| {
            if link.has_photo() {
                format!(
                    r#"{}{}<div class="link-label">{}</div></a>"#,
                    anchor_open(link, "link-card"),
                    photo(link),
                    label(link)
                )
            } else {
                format!("{}{}</a>", anchor_open(link, "link-button"), label(link))
            }
        })
        .collect();
    format!(r#"<div class="{}">{}</div>"#, list_class("layout-mixed", text_shadow), items)
}

/// Two-column grid; every third tile spans both columns.
fn render_bento(links: &[Link], text_shadow: bool) -> String {
    let items: String = links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            let class = if i % 3 == 0 { "link-tile span-2" } else { "link-tile" };
            let media = if link.has_photo() { photo(link) } else { String::new() };
            format!(
                r#"{}{}<div class="link-label">{}</div></a>"#,
                anchor_open(link, class),
                media,
                label(link)
            )
        })
        .collect();
    format!(r#"<div class="{}">{}</div>"#, list_class("layout-bento", text_shadow), items)
}
