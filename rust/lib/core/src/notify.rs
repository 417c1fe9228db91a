//! Transient notifications ("toasts") surfaced to the user.
//!
//! Handlers push toasts into a per-request [`Notifier`]; the page shell
//! renders whatever was collected into the toast region of the document.

use serde::Serialize;

use crate::html::escape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    Success,
    Info,
    Error,
    /// Blocking problem with the current action (e.g. a navigation guard fired).
    Destructive,
}

impl ToastVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastVariant::Success => "success",
            ToastVariant::Info => "info",
            ToastVariant::Error => "error",
            ToastVariant::Destructive => "destructive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub variant: ToastVariant,
    pub title: String,
    pub message: String,
}

impl Toast {
    pub fn new(variant: ToastVariant, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            variant,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Collects toasts for a single response.
#[derive(Debug, Default, Clone)]
pub struct Notifier {
    toasts: Vec<Toast>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    pub fn success(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(Toast::new(ToastVariant::Success, title, message));
    }

    pub fn info(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(Toast::new(ToastVariant::Info, title, message));
    }

    pub fn error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(Toast::new(ToastVariant::Error, title, message));
    }

    pub fn destructive(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(Toast::new(ToastVariant::Destructive, title, message));
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Whether a toast of the given variant was pushed.
    pub fn fired(&self, variant: ToastVariant) -> bool {
        self.toasts.iter().any(|t| t.variant == variant)
    }

    /// Render the toast region. Empty string when nothing was pushed.
    pub fn render(&self) -> String {
        if self.toasts.is_empty() {
            return String::new();
        }
        let mut out = String::from(r#"<ol class="toasts" role="status">"#);
        for toast in &self.toasts {
            out.push_str(&format!(
                r#"<li class="toast toast-{}"><strong>{}</strong><p>{}</p></li>"#,
                toast.variant.as_str(),
                escape(&toast.title),
                escape(&toast.message),
            ));
        }
        out.push_str("</ol>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_in_order() {
        let mut n = Notifier::new();
        n.success("Saved", "Appearance updated");
        n.destructive("Cannot edit", "username unknown");
        assert_eq!(n.toasts().len(), 2);
        assert_eq!(n.toasts()[0].variant, ToastVariant::Success);
        assert!(n.fired(ToastVariant::Destructive));
        assert!(!n.fired(ToastVariant::Error));
    }

    #[test]
    fn render_empty() {
        assert_eq!(Notifier::new().render(), "");
    }

    #[test]
    fn render_escapes_message() {
        let mut n = Notifier::new();
        n.error("Load failed", "<script>");
        let html = n.render();
        assert!(html.contains("toast-error"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
