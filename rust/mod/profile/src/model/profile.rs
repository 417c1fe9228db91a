use serde::Serialize;

use crate::url::path_segment;

/// A validated profile. `id` and `username` are never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub bio: String,
    pub avatar_url: String,
    pub custom_title: Option<String>,
}

impl Profile {
    /// Name shown in headings; falls back to the username.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }

    /// Document title: the custom title, else `"{name} (@{username})"`.
    pub fn page_title(&self) -> String {
        match self.custom_title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("{} (@{})", self.display_name(), self.username),
        }
    }

    /// Path of the public page.
    pub fn public_path(&self) -> String {
        format!("/{}", path_segment(&self.username))
    }

    /// Path of the owner's profile editor.
    pub fn edit_path(&self) -> String {
        format!("/edit-profile/{}", path_segment(&self.username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> Profile {
        Profile {
            id: "p1".into(),
            username: "ada".into(),
            full_name: "Ada Lovelace".into(),
            bio: String::new(),
            avatar_url: String::new(),
            custom_title: None,
        }
    }

    #[test]
    fn title_prefers_custom() {
        let mut p = ada();
        assert_eq!(p.page_title(), "Ada Lovelace (@ada)");
        p.custom_title = Some("  ".into());
        assert_eq!(p.page_title(), "Ada Lovelace (@ada)");
        p.custom_title = Some("Ada's links".into());
        assert_eq!(p.page_title(), "Ada's links");
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let mut p = ada();
        p.full_name = String::new();
        assert_eq!(p.display_name(), "ada");
        assert_eq!(p.page_title(), "ada (@ada)");
        assert_eq!(p.public_path(), "/ada");
        assert_eq!(p.edit_path(), "/edit-profile/ada");
    }

    #[test]
    fn paths_encode_the_username() {
        let mut p = ada();
        p.username = "ada lovelace\u{1}".into();
        assert_eq!(p.public_path(), "/ada%20lovelace%01");
        assert_eq!(p.edit_path(), "/edit-profile/ada%20lovelace%01");
    }
}
