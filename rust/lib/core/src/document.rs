//! Root-element state of a rendered page.
//!
//! A [`DocumentRoot`] holds the classes and CSS custom properties placed on
//! the `<html>` element. Page handlers never mutate it directly; they
//! acquire a [`StyleContext`] for the lifetime of a view and the context
//! reverts its changes when dropped. A root belongs to a single render and
//! is not shared across threads.

use std::collections::{BTreeMap, BTreeSet};
use std::cell::{Ref, RefCell, RefMut};

pub const DARK_CLASS: &str = "dark";
pub const FONT_PROPERTY: &str = "--font-family";

#[derive(Debug, Default)]
struct RootState {
    classes: BTreeSet<String>,
    properties: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
pub struct DocumentRoot {
    state: RefCell<RootState>,
}

impl DocumentRoot {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Ref<'_, RootState> {
        self.state.borrow()
    }

    fn state_mut(&self) -> RefMut<'_, RootState> {
        self.state.borrow_mut()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.state().classes.contains(class)
    }

    pub fn property(&self, name: &str) -> Option<String> {
        self.state().properties.get(name).cloned()
    }

    /// Value for the `class` attribute of `<html>`.
    pub fn class_attr(&self) -> String {
        self.state()
            .classes
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Value for the `style` attribute of `<html>`.
    pub fn style_attr(&self) -> String {
        self.state()
            .properties
            .iter()
            .map(|(k, v)| format!("{}: {};", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Apply the dark-mode class and font property for one view.
    ///
    /// Both are reverted when the returned context is dropped.
    pub fn apply_style(&self, dark_mode: bool, font_family: &str) -> StyleContext<'_> {
        let mut state = self.state_mut();
        let added_dark = dark_mode && state.classes.insert(DARK_CLASS.to_string());
        let previous_font = state
            .properties
            .insert(FONT_PROPERTY.to_string(), font_family.to_string());
        drop(state);

        StyleContext {
            root: self,
            added_dark,
            previous_font,
        }
    }
}

/// View-lifetime style changes on a [`DocumentRoot`].
#[derive(Debug)]
pub struct StyleContext<'a> {
    root: &'a DocumentRoot,
    added_dark: bool,
    previous_font: Option<String>,
}

impl Drop for StyleContext<'_> {
    fn drop(&mut self) {
        let mut state = self.root.state_mut();
        if self.added_dark {
            state.classes.remove(DARK_CLASS);
        }
        match self.previous_font.take() {
            Some(font) => {
                state.properties.insert(FONT_PROPERTY.to_string(), font);
            }
            None => {
                state.properties.remove(FONT_PROPERTY);
            }
        }
    }
}
