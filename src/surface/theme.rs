//! Button variants and class-name styling

use crate::dialog::types::{Region, Variant};
use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

/// Built-in style of a button variant
pub fn base_variant_style(variant: Variant) -> Style {
    let (bg, fg) = match variant {
        Variant::Primary => (Color::Rgb(37, 99, 235), Color::Rgb(255, 255, 255)), // #2563eb
        Variant::Secondary => (Color::Rgb(229, 231, 235), Color::Rgb(17, 17, 17)), // #e5e7eb
        Variant::Danger => (Color::Rgb(220, 38, 38), Color::Rgb(255, 255, 255)),  // #dc2626
        Variant::Success => (Color::Rgb(22, 163, 74), Color::Rgb(255, 255, 255)), // #16a34a
        Variant::Warning => (Color::Rgb(245, 158, 11), Color::Rgb(17, 17, 17)),   // #f59e0b
        Variant::Info => (Color::Rgb(14, 165, 233), Color::Rgb(255, 255, 255)),   // #0ea5e9
        Variant::Neutral => (Color::Rgb(107, 114, 128), Color::Rgb(255, 255, 255)), // #6b7280
    };
    Style::default().bg(bg).fg(fg).add_modifier(Modifier::BOLD)
}

/// Class every element of a region carries before any configured class
pub fn base_class(region: Region) -> Option<&'static str> {
    match region {
        Region::Backdrop | Region::Dialog => None,
        Region::CloseButton => Some("hook-dialog-close-button"),
        Region::Title => Some("hook-dialog-title"),
        Region::Content => Some("hook-dialog-content"),
        Region::Actions => Some("hook-dialog-actions"),
        Region::ActionsRow => Some("hook-dialog-actions-row"),
        Region::ActionButton => Some("hook-dialog-action-button"),
    }
}

/// Variant class of an action button
pub fn variant_class(variant: Variant) -> String {
    format!("hook-dialog-action-{}", variant.as_str())
}

/// Styles looked up by class name at render time
///
/// Classes of an element are applied in order, each one patching the last.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    classes: HashMap<String, Style>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class: impl Into<String>, style: Style) -> Self {
        self.insert(class, style);
        self
    }

    pub fn insert(&mut self, class: impl Into<String>, style: Style) {
        self.classes.insert(class.into(), style);
    }

    pub fn get(&self, class: &str) -> Option<&Style> {
        self.classes.get(class)
    }

    /// Combined style of a class list. Entries may hold several
    /// whitespace-separated classes; unknown classes are skipped.
    pub fn resolve<S: AsRef<str>>(&self, classes: &[S]) -> Style {
        classes
            .iter()
            .flat_map(|entry| entry.as_ref().split_whitespace())
            .filter_map(|class| self.classes.get(class))
            .fold(Style::default(), |style, class_style| style.patch(*class_style))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
