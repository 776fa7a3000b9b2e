//! Configuration merging
//!
//! Three layers feed every dialog, in ascending precedence: renderer
//! defaults, hook defaults and the per-call configuration. Flags and
//! content use last-writer-wins. Class names are merged per region with the
//! most specific value replacing the others. Styles are merged per region
//! (and per variant) with [`Style::patch`], so an attribute set by a less
//! specific layer survives unless a more specific layer sets it too.

use super::types::{
    Action, DialogConfig, DialogContent, DialogDefaults, KeyedMap, RegionMap, VariantMap,
};
use ratatui::style::Style;
use serde_json::Value;

/// Fully merged configuration of one dialog instance
#[derive(Debug, Clone, Default)]
pub struct EffectiveConfig {
    pub title: Option<String>,
    pub content: Option<DialogContent>,
    pub actions: Vec<Vec<Action>>,
    pub backdrop_cancel: bool,
    pub reject_on_cancel: bool,
    pub default_cancel_value: Value,
    pub show_close_button: bool,
    pub is_return_submit: bool,
    pub class_names: RegionMap<String>,
    pub styles: RegionMap<Style>,
    pub variant_styles: VariantMap<Style>,
}

impl EffectiveConfig {
    /// All configured actions, row by row
    pub fn all_actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().flatten()
    }

    pub fn has_cancel_action(&self) -> bool {
        self.all_actions().any(|action| action.is_cancel)
    }

    /// First action flagged `is_focused`
    pub fn default_action(&self) -> Option<&Action> {
        self.all_actions().find(|action| action.is_focused)
    }

    pub fn focused_action_count(&self) -> usize {
        self.all_actions().filter(|action| action.is_focused).count()
    }
}

/// Merge the three configuration layers into the effective configuration
pub fn merge(renderer: &DialogDefaults, hook: &DialogDefaults, call: &DialogConfig) -> EffectiveConfig {
    let actions = call.actions.clone().unwrap_or_default();
    let has_cancel = actions.iter().flatten().any(|action| action.is_cancel);

    // The backdrop becomes the only cancel path when no action can cancel
    let backdrop_cancel = match call.backdrop_cancel {
        Some(explicit) => explicit,
        None if !has_cancel => true,
        None => pick(hook.backdrop_cancel, renderer.backdrop_cancel).unwrap_or(false),
    };

    EffectiveConfig {
        title: call.title.clone(),
        content: call.content.clone(),
        actions,
        backdrop_cancel,
        reject_on_cancel: call
            .reject_on_cancel
            .or(pick(hook.reject_on_cancel, renderer.reject_on_cancel))
            .unwrap_or(true),
        default_cancel_value: call
            .default_cancel_value
            .clone()
            .or_else(|| {
                pick(
                    hook.default_cancel_value.clone(),
                    renderer.default_cancel_value.clone(),
                )
            })
            .unwrap_or(Value::Null),
        show_close_button: call
            .show_close_button
            .or(pick(hook.show_close_button, renderer.show_close_button))
            .unwrap_or(false),
        is_return_submit: call.is_return_submit.unwrap_or(false),
        class_names: merge_replace([&renderer.class_names, &hook.class_names, &call.class_names]),
        styles: merge_patch([&renderer.styles, &hook.styles, &call.styles]),
        variant_styles: merge_patch([
            &renderer.variant_styles,
            &hook.variant_styles,
            &call.variant_styles,
        ]),
    }
}

fn pick<T>(specific: Option<T>, general: Option<T>) -> Option<T> {
    specific.or(general)
}

/// Key-wise merge where the most specific layer's value replaces the rest.
/// Layers are given least specific first.
fn merge_replace<K: Ord + Copy, V: Clone>(layers: [&KeyedMap<K, V>; 3]) -> KeyedMap<K, V> {
    let mut merged = KeyedMap::new();
    for layer in layers {
        for (key, value) in layer.iter() {
            merged.insert(key, value.clone());
        }
    }
    merged
}

/// Key-wise merge where styles for the same key are patched together.
/// Layers are given least specific first.
fn merge_patch<K: Ord + Copy>(layers: [&KeyedMap<K, Style>; 3]) -> KeyedMap<K, Style> {
    let mut merged: KeyedMap<K, Style> = KeyedMap::new();
    for layer in layers {
        for (key, style) in layer.iter() {
            let base = merged.get(key).copied().unwrap_or_default();
            merged.insert(key, base.patch(*style));
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::types::{Region, Variant};
    use ratatui::style::{Color, Modifier};
    use serde_json::json;

    fn confirm_actions() -> Vec<Vec<Action>> {
        vec![vec![
            Action::new("Cancel").cancel(true),
            Action::new("OK").with_variant(Variant::Primary).with_value(true),
        ]]
    }

    #[test]
    fn test_styles_merge_per_attribute() {
        let renderer = DialogDefaults::new().with_style(Region::Dialog, Style::default().fg(Color::Red));
        let hook = DialogDefaults::new().with_style(Region::Dialog, Style::default().bg(Color::Blue));
        let call = DialogConfig::new().with_style(Region::Dialog, Style::default().fg(Color::Green));

        let config = merge(&renderer, &hook, &call);
        let dialog = config.styles.get(Region::Dialog).copied().unwrap();

        assert_eq!(dialog.fg, Some(Color::Green));
        assert_eq!(dialog.bg, Some(Color::Blue));
    }

    #[test]
    fn test_unrelated_regions_survive() {
        let renderer = DialogDefaults::new()
            .with_style(Region::Backdrop, Style::default().add_modifier(Modifier::DIM));
        let call = DialogConfig::new().with_style(Region::Title, Style::default().fg(Color::Yellow));

        let config = merge(&renderer, &DialogDefaults::new(), &call);

        assert!(config.styles.contains(Region::Backdrop));
        assert!(config.styles.contains(Region::Title));
        assert_eq!(config.styles.len(), 2);
    }

    #[test]
    fn test_class_names_most_specific_wins() {
        let renderer = DialogDefaults::new()
            .with_class_name(Region::Dialog, "renderer")
            .with_class_name(Region::Title, "renderer-title");
        let hook = DialogDefaults::new().with_class_name(Region::Dialog, "hook");
        let call = DialogConfig::new().with_class_name(Region::Dialog, "call");

        let config = merge(&renderer, &hook, &call);

        assert_eq!(config.class_names.get(Region::Dialog).map(String::as_str), Some("call"));
        assert_eq!(
            config.class_names.get(Region::Title).map(String::as_str),
            Some("renderer-title")
        );
    }

    #[test]
    fn test_variant_styles_merge() {
        let hook = DialogDefaults::new()
            .with_variant_style(Variant::Primary, Style::default().bg(Color::Magenta));
        let call = DialogConfig::new()
            .with_variant_style(Variant::Primary, Style::default().fg(Color::White));

        let config = merge(&DialogDefaults::new(), &hook, &call);
        let primary = config.variant_styles.get(Variant::Primary).copied().unwrap();

        assert_eq!(primary.bg, Some(Color::Magenta));
        assert_eq!(primary.fg, Some(Color::White));
    }

    #[test]
    fn test_flags_last_writer_wins() {
        let renderer = DialogDefaults::new().show_close_button(true).reject_on_cancel(false);
        let hook = DialogDefaults::new().show_close_button(false);
        let call = DialogConfig::new();

        let config = merge(&renderer, &hook, &call);

        assert!(!config.show_close_button);
        assert!(!config.reject_on_cancel);

        let config = merge(&renderer, &hook, &DialogConfig::new().reject_on_cancel(true));
        assert!(config.reject_on_cancel);
    }

    #[test]
    fn test_builtin_defaults() {
        let config = merge(&DialogDefaults::new(), &DialogDefaults::new(), &DialogConfig::new());

        assert!(config.reject_on_cancel);
        assert!(!config.show_close_button);
        assert!(!config.is_return_submit);
        assert_eq!(config.default_cancel_value, Value::Null);
        assert!(config.actions.is_empty());
    }

    #[test]
    fn test_backdrop_inferred_without_cancel_action() {
        let call = DialogConfig::new().with_actions(vec![vec![Action::new("OK")]]);
        let config = merge(&DialogDefaults::new(), &DialogDefaults::new(), &call);
        assert!(config.backdrop_cancel);

        // Layer defaults do not disable the inference, only the call can
        let hook = DialogDefaults::new().backdrop_cancel(false);
        let config = merge(&DialogDefaults::new(), &hook, &call);
        assert!(config.backdrop_cancel);

        let config = merge(&DialogDefaults::new(), &hook, &call.clone().backdrop_cancel(false));
        assert!(!config.backdrop_cancel);
    }

    #[test]
    fn test_backdrop_defaults_false_with_cancel_action() {
        let call = DialogConfig::new().with_actions(confirm_actions());
        let config = merge(&DialogDefaults::new(), &DialogDefaults::new(), &call);
        assert!(!config.backdrop_cancel);

        let renderer = DialogDefaults::new().backdrop_cancel(true);
        let config = merge(&renderer, &DialogDefaults::new(), &call);
        assert!(config.backdrop_cancel);

        let config = merge(&renderer, &DialogDefaults::new(), &call.clone().backdrop_cancel(false));
        assert!(!config.backdrop_cancel);
    }

    #[test]
    fn test_default_cancel_value_layers() {
        let hook = DialogDefaults::new().with_default_cancel_value("hook");
        let config = merge(&DialogDefaults::new(), &hook, &DialogConfig::new());
        assert_eq!(config.default_cancel_value, json!("hook"));

        let call = DialogConfig::new().with_default_cancel_value(0);
        let config = merge(&DialogDefaults::new(), &hook, &call);
        assert_eq!(config.default_cancel_value, json!(0));
    }

    #[test]
    fn test_merge_is_repeatable() {
        let renderer = DialogDefaults::new().with_style(Region::Dialog, Style::default().fg(Color::Red));
        let call = DialogConfig::new().with_actions(confirm_actions());

        let first = merge(&renderer, &DialogDefaults::new(), &call);
        let second = merge(&renderer, &DialogDefaults::new(), &call);

        assert_eq!(first.styles, second.styles);
        assert_eq!(first.backdrop_cancel, second.backdrop_cancel);
        assert_eq!(first.actions.len(), second.actions.len());
    }

    #[test]
    fn test_default_action_lookup() {
        let call = DialogConfig::new().with_actions(vec![
            vec![Action::new("Back").on_left(true)],
            vec![Action::new("A").focused(true), Action::new("B").focused(true)],
        ]);
        let config = merge(&DialogDefaults::new(), &DialogDefaults::new(), &call);

        assert_eq!(config.default_action().map(|a| a.title.as_str()), Some("A"));
        assert_eq!(config.focused_action_count(), 2);
    }
}
