//! Wizard definitions: ordered field lists.

use serde::{Deserialize, Serialize};

/// What kind of answer a field expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free-form text answer.
    #[default]
    Text,
    /// One or more file attachments, stored as an opaque serialized list.
    File,
}

/// A single step of a wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Stable key the collected value is stored under. Values are keyed by
    /// name, never by index, so fields can be reordered across versions.
    pub name: String,
    /// Prompt text shown to the user.
    pub label: String,
    /// Optional example or hint appended to the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Whether an empty answer must be rejected with a reminder.
    #[serde(default)]
    pub required: bool,
    /// Expected answer kind.
    #[serde(default)]
    pub kind: FieldKind,
}

impl Field {
    /// A required free-text field.
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            placeholder: None,
            required: true,
            kind: FieldKind::Text,
        }
    }

    /// A required file-upload field.
    pub fn file(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::File,
            ..Self::text(name, label)
        }
    }

    /// Mark the field optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Attach a placeholder hint.
    pub fn with_placeholder(mut self, hint: impl Into<String>) -> Self {
        self.placeholder = Some(hint.into());
        self
    }
}

/// An ordered data-collection dialog. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardDefinition {
    /// Human-readable title, shown in the intro prompt.
    pub title: String,
    /// Fields in the order they are asked.
    pub fields: Vec<Field>,
}

impl WizardDefinition {
    /// Create a definition from a title and ordered fields.
    ///
    /// A definition with zero fields is valid: starting it yields an
    /// immediately completed wizard, which callers treat as auto-submit.
    pub fn new(title: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            title: title.into(),
            fields,
        }
    }
}
