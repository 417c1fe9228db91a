//! Minimal HTML helpers shared by every page.

use crate::document::DocumentRoot;
use crate::notify::Notifier;

const BASE_CSS: &str = include_str!("web/base.css");

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `<head>` contents that vary per page.
#[derive(Debug, Default)]
pub struct PageHead<'a> {
    pub title: &'a str,
    pub favicon: Option<&'a str>,
}

/// Wrap a body fragment in the full document.
///
/// Root classes and custom properties come from `root`; collected
/// toasts are rendered before the body.
pub fn render_page(head: &PageHead<'_>, root: &DocumentRoot, notifier: &Notifier, body: &str) -> String {
    let favicon = head
        .favicon
        .filter(|f| !f.is_empty())
        .map(|f| format!(r#"<link rel="icon" href="{}">"#, escape(f)))
        .unwrap_or_default();

    format!(
        concat!(
            "<!DOCTYPE html>\n",
            r#"<html lang="en" class="{class}" style="{style}">"#,
            "<head>",
            r#"<meta charset="utf-8">"#,
            r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#,
            "<title>{title}</title>{favicon}<style>{css}</style>",
            "</head>",
            "<body>{toasts}{body}</body>",
            "</html>\n",
        ),
        class = escape(&root.class_attr()),
        style = escape(&root.style_attr()),
        title = escape(head.title),
        favicon = favicon,
        css = BASE_CSS,
        toasts = notifier.render(),
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_special_chars() {
        assert_eq!(escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn page_carries_root_state_and_toasts() {
        let root = DocumentRoot::new();
        let mut notifier = Notifier::new();
        notifier.info("Heads up", "hello");
        let _style = root.apply_style(true, "ui-monospace, monospace");

        let head = PageHead { title: "Ada <3", favicon: Some("https://x/icon.png") };
        let html = render_page(&head, &root, &notifier, "<main>body</main>");

        assert!(html.contains(r#"class="dark""#));
        assert!(html.contains("--font-family: ui-monospace, monospace;"));
        assert!(html.contains("<title>Ada &lt;3</title>"));
        assert!(html.contains(r#"<link rel="icon" href="https://x/icon.png">"#));
        assert!(html.contains(r#"class="toast toast-info""#));
        assert!(html.contains("<main>body</main>"));
    }

    #[test]
    fn empty_favicon_is_skipped() {
        let head = PageHead { title: "t", favicon: Some("") };
        let html = render_page(&head, &DocumentRoot::new(), &Notifier::new(), "");
        assert!(!html.contains("rel=\"icon\""));
    }
}
