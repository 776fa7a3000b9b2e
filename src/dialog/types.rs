//! Core dialog types
//!
//! Identifiers, actions, configuration layers and the error types shared by
//! the rest of the dialog system.

use super::form::FormContent;
use super::manager::DialogContext;
use ratatui::style::Style;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Unique identifier for dialog instances
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DialogId(pub String);

impl DialogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DialogId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DialogId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visual style bucket for an action button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Primary,
    Secondary,
    Danger,
    Success,
    Warning,
    Info,
    Neutral,
}

impl Variant {
    pub const ALL: [Variant; 7] = [
        Variant::Primary,
        Variant::Secondary,
        Variant::Danger,
        Variant::Success,
        Variant::Warning,
        Variant::Info,
        Variant::Neutral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Primary => "primary",
            Variant::Secondary => "secondary",
            Variant::Danger => "danger",
            Variant::Success => "success",
            Variant::Warning => "warning",
            Variant::Info => "info",
            Variant::Neutral => "neutral",
        }
    }
}

impl Default for Variant {
    fn default() -> Self {
        Self::Secondary
    }
}

/// Styleable region of a rendered dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Region {
    Backdrop,
    Dialog,
    CloseButton,
    Title,
    Content,
    Actions,
    ActionsRow,
    ActionButton,
}


/// Map over a closed key set (dialog regions or button variants)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyedMap<K: Ord, V>(BTreeMap<K, V>);

/// Per-region overrides, used for both class names and styles
pub type RegionMap<V> = KeyedMap<Region, V>;

/// Per-variant overrides for action buttons
pub type VariantMap<V> = KeyedMap<Variant, V>;

impl<K: Ord, V> Default for KeyedMap<K, V> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<K: Ord + Copy, V> KeyedMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: K, value: V) -> Self {
        self.0.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.0.insert(key, value)
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.0.get(&key)
    }

    pub fn contains(&self, key: K) -> bool {
        self.0.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.0.iter().map(|(key, value)| (*key, value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for KeyedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Click callback attached to an action. Receives the action that was
/// pressed and the context of its dialog; reach the service through
/// [`DialogContext::service`] rather than capturing a clone of it.
pub type ActionCallback = Arc<dyn Fn(&Action, &DialogContext) + Send + Sync>;

/// A button in one of the dialog's action rows
#[derive(Clone, Default)]
pub struct Action {
    /// Button label
    pub title: String,
    /// Value delivered to the caller when this action settles the dialog
    pub value: Value,
    /// Cancel button: settles according to `reject_on_cancel`
    pub is_cancel: bool,
    /// Placed in the left group of its row
    pub is_on_left: bool,
    /// Receives initial focus
    pub is_focused: bool,
    /// Submits the form content
    pub is_submit: bool,
    /// Only runs the click callback, never settles the dialog by itself
    pub no_action_return: bool,
    pub variant: Option<Variant>,
    pub class_name: Option<String>,
    pub style: Option<Style>,
    pub on_click: Option<ActionCallback>,
}

impl Action {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn on_click(
        mut self,
        callback: impl Fn(&Action, &DialogContext) + Send + Sync + 'static,
    ) -> Self {
        self.on_click = Some(Arc::new(callback));
        self
    }

    pub fn cancel(mut self, is_cancel: bool) -> Self {
        self.is_cancel = is_cancel;
        self
    }

    pub fn on_left(mut self, is_on_left: bool) -> Self {
        self.is_on_left = is_on_left;
        self
    }

    pub fn focused(mut self, is_focused: bool) -> Self {
        self.is_focused = is_focused;
        self
    }

    pub fn submit(mut self, is_submit: bool) -> Self {
        self.is_submit = is_submit;
        self
    }

    pub fn no_action_return(mut self, no_action_return: bool) -> Self {
        self.no_action_return = no_action_return;
        self
    }

    /// Variant used for styling, `Secondary` when unset
    pub fn effective_variant(&self) -> Variant {
        self.variant.unwrap_or_default()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("title", &self.title)
            .field("value", &self.value)
            .field("is_cancel", &self.is_cancel)
            .field("is_on_left", &self.is_on_left)
            .field("is_focused", &self.is_focused)
            .field("is_submit", &self.is_submit)
            .field("no_action_return", &self.no_action_return)
            .field("variant", &self.variant)
            .field("class_name", &self.class_name)
            .field("style", &self.style)
            .field("on_click", &self.on_click.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

/// Body of a dialog
#[derive(Debug, Clone)]
pub enum DialogContent {
    Text(String),
    Form(FormContent),
}

impl DialogContent {
    pub fn as_form(&self) -> Option<&FormContent> {
        match self {
            DialogContent::Form(form) => Some(form),
            DialogContent::Text(_) => None,
        }
    }
}

impl From<&str> for DialogContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for DialogContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<FormContent> for DialogContent {
    fn from(form: FormContent) -> Self {
        Self::Form(form)
    }
}

/// Configuration for a single dialog request
///
/// Unset fields fall back to the hook and renderer defaults.
#[derive(Debug, Clone, Default)]
pub struct DialogConfig {
    pub title: Option<String>,
    pub content: Option<DialogContent>,
    /// Rows of action buttons
    pub actions: Option<Vec<Vec<Action>>>,
    pub backdrop_cancel: Option<bool>,
    pub reject_on_cancel: Option<bool>,
    pub default_cancel_value: Option<Value>,
    pub show_close_button: Option<bool>,
    /// Submit actions resolve with the form values instead of their own value
    pub is_return_submit: Option<bool>,
    pub class_names: RegionMap<String>,
    pub styles: RegionMap<Style>,
    pub variant_styles: VariantMap<Style>,
}

impl DialogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<DialogContent>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_actions(mut self, actions: Vec<Vec<Action>>) -> Self {
        self.actions = Some(actions);
        self
    }

    pub fn backdrop_cancel(mut self, backdrop_cancel: bool) -> Self {
        self.backdrop_cancel = Some(backdrop_cancel);
        self
    }

    pub fn reject_on_cancel(mut self, reject_on_cancel: bool) -> Self {
        self.reject_on_cancel = Some(reject_on_cancel);
        self
    }

    pub fn with_default_cancel_value(mut self, value: impl Into<Value>) -> Self {
        self.default_cancel_value = Some(value.into());
        self
    }

    pub fn show_close_button(mut self, show: bool) -> Self {
        self.show_close_button = Some(show);
        self
    }

    pub fn return_submit(mut self, is_return_submit: bool) -> Self {
        self.is_return_submit = Some(is_return_submit);
        self
    }

    pub fn with_class_name(mut self, region: Region, class_name: impl Into<String>) -> Self {
        self.class_names.insert(region, class_name.into());
        self
    }

    pub fn with_style(mut self, region: Region, style: Style) -> Self {
        self.styles.insert(region, style);
        self
    }

    pub fn with_variant_style(mut self, variant: Variant, style: Style) -> Self {
        self.variant_styles.insert(variant, style);
        self
    }
}

/// Defaults applied to every dialog of a renderer or of a hook
///
/// Class names and flags can be loaded from JSON; styles are set in code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DialogDefaults {
    pub backdrop_cancel: Option<bool>,
    pub reject_on_cancel: Option<bool>,
    pub default_cancel_value: Option<Value>,
    pub show_close_button: Option<bool>,
    pub class_names: RegionMap<String>,
    #[serde(skip)]
    pub styles: RegionMap<Style>,
    #[serde(skip)]
    pub variant_styles: VariantMap<Style>,
}

impl DialogDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backdrop_cancel(mut self, backdrop_cancel: bool) -> Self {
        self.backdrop_cancel = Some(backdrop_cancel);
        self
    }

    pub fn reject_on_cancel(mut self, reject_on_cancel: bool) -> Self {
        self.reject_on_cancel = Some(reject_on_cancel);
        self
    }

    pub fn with_default_cancel_value(mut self, value: impl Into<Value>) -> Self {
        self.default_cancel_value = Some(value.into());
        self
    }

    pub fn show_close_button(mut self, show: bool) -> Self {
        self.show_close_button = Some(show);
        self
    }

    pub fn with_class_name(mut self, region: Region, class_name: impl Into<String>) -> Self {
        self.class_names.insert(region, class_name.into());
        self
    }

    pub fn with_style(mut self, region: Region, style: Style) -> Self {
        self.styles.insert(region, style);
        self
    }

    pub fn with_variant_style(mut self, variant: Variant, style: Style) -> Self {
        self.variant_styles.insert(variant, style);
        self
    }

    /// Overlay the fields `other` sets onto `self`
    pub fn merge_with(&mut self, other: Self) {
        if other.backdrop_cancel.is_some() {
            self.backdrop_cancel = other.backdrop_cancel;
        }
        if other.reject_on_cancel.is_some() {
            self.reject_on_cancel = other.reject_on_cancel;
        }
        if other.default_cancel_value.is_some() {
            self.default_cancel_value = other.default_cancel_value;
        }
        if other.show_close_button.is_some() {
            self.show_close_button = other.show_close_button;
        }
        for (region, class_name) in other.class_names.0 {
            self.class_names.insert(region, class_name);
        }
        for (region, style) in other.styles.0 {
            let merged = self.styles.get(region).copied().unwrap_or_default().patch(style);
            self.styles.insert(region, merged);
        }
        for (variant, style) in other.variant_styles.0 {
            let merged = self
                .variant_styles
                .get(variant)
                .copied()
                .unwrap_or_default()
                .patch(style);
            self.variant_styles.insert(variant, merged);
        }
    }
}

/// Result type for dialog operations
pub type DialogResult<T> = std::result::Result<T, DialogError>;

/// Dialog-specific error types
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("Dialog instance with id '{0}' not found")]
    NotFound(DialogId),

    #[error("No default action (is_focused) defined for dialog instance with id '{0}'")]
    NoDefaultAction(DialogId),

    #[error("Dialog instance with id '{0}' already exists")]
    AlreadyExists(DialogId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DialogError {
    /// Both "unknown id" and "no default action" are lookup failures
    pub fn is_not_found(&self) -> bool {
        matches!(self, DialogError::NotFound(_) | DialogError::NoDefaultAction(_))
    }
}

/// Why a dialog future completed with an error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DialogRejection {
    /// The dialog was cancelled (or a cancel action was pressed) and rejected
    #[error("dialog rejected with value {0}")]
    Rejected(Value),

    /// The service went away before the dialog settled
    #[error("dialog was dropped before it settled")]
    Dropped,
}

impl DialogRejection {
    /// Rejected value, `Null` for a dropped dialog
    pub fn value(&self) -> &Value {
        match self {
            DialogRejection::Rejected(value) => value,
            DialogRejection::Dropped => &Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;
    use serde_json::json;

    #[test]
    fn test_action_builder() {
        let action = Action::new("Delete")
            .with_variant(Variant::Danger)
            .with_value(true)
            .focused(true);

        assert_eq!(action.title, "Delete");
        assert_eq!(action.value, json!(true));
        assert_eq!(action.effective_variant(), Variant::Danger);
        assert!(action.is_focused);
        assert!(!action.is_cancel);
    }

    #[test]
    fn test_variant_defaults_to_secondary() {
        assert_eq!(Action::new("OK").effective_variant(), Variant::Secondary);
    }

    #[test]
    fn test_defaults_from_json() {
        let defaults: DialogDefaults = serde_json::from_str(
            r#"{"showCloseButton": true, "rejectOnCancel": false, "classNames": {"dialog": "wide", "actionButton": "btn"}}"#,
        )
        .unwrap();

        assert_eq!(defaults.show_close_button, Some(true));
        assert_eq!(defaults.reject_on_cancel, Some(false));
        assert_eq!(defaults.backdrop_cancel, None);
        assert_eq!(defaults.class_names.get(Region::Dialog).map(String::as_str), Some("wide"));
        assert_eq!(defaults.class_names.get(Region::ActionButton).map(String::as_str), Some("btn"));
    }

    #[test]
    fn test_defaults_merge_with() {
        let mut base = DialogDefaults::new()
            .show_close_button(false)
            .with_style(Region::Dialog, Style::default().fg(Color::Red));
        let overlay = DialogDefaults::new()
            .show_close_button(true)
            .with_style(Region::Dialog, Style::default().bg(Color::Blue));

        base.merge_with(overlay);

        assert_eq!(base.show_close_button, Some(true));
        let dialog = base.styles.get(Region::Dialog).copied().unwrap();
        assert_eq!(dialog.fg, Some(Color::Red));
        assert_eq!(dialog.bg, Some(Color::Blue));
    }

    #[test]
    fn test_rejection_value() {
        assert_eq!(DialogRejection::Rejected(json!("x")).value(), &json!("x"));
        assert_eq!(DialogRejection::Dropped.value(), &Value::Null);
    }
}
