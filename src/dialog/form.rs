//! Form content for dialogs
//!
//! A form is an ordered list of named text fields. Field names may repeat;
//! serialized form data keeps a single value for a name seen once and a list
//! of values for a name seen more than once.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Native submission handler, invoked with the current form values
pub type SubmitHandler = Arc<dyn Fn(&FormData) + Send + Sync>;

/// A single named text input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub label: Option<String>,
    pub value: String,
}

impl FormField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            value: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Text shown in front of the input
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Form shown as dialog content
#[derive(Clone, Default)]
pub struct FormContent {
    pub fields: Vec<FormField>,
    pub on_submit: Option<SubmitHandler>,
}

impl FormContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn on_submit(mut self, handler: impl Fn(&FormData) + Send + Sync + 'static) -> Self {
        self.on_submit = Some(Arc::new(handler));
        self
    }

    /// Snapshot of the current field values, in field order
    pub fn data(&self) -> FormData {
        FormData(
            self.fields
                .iter()
                .map(|field| (field.name.clone(), field.value.clone()))
                .collect(),
        )
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut FormField> {
        self.fields.get_mut(index)
    }

    /// Run native submission, if a handler is attached
    pub fn request_submit(&self) {
        if let Some(handler) = &self.on_submit {
            handler(&self.data());
        }
    }
}

impl fmt::Debug for FormContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormContent")
            .field("fields", &self.fields)
            .field("on_submit", &self.on_submit.as_ref().map(|_| "<handler>"))
            .finish()
    }
}

/// Ordered name/value pairs read from a form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData(pub Vec<(String, String)>);

impl FormData {
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// All values recorded for `name`
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries()
            .filter(|(key, _)| *key == name)
            .map(|(_, value)| value)
            .collect()
    }

    /// Plain JSON object; repeated names become arrays
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        for (name, value) in self.entries() {
            let value = Value::String(value.to_string());
            match object.get_mut(name) {
                Some(Value::Array(existing)) => existing.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    object.insert(name.to_string(), value);
                }
            }
        }
        Value::Object(object)
    }
}
