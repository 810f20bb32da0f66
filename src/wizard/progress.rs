//! Wizard progress: the serializable per-user cursor over a definition.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::definition::{Field, WizardDefinition};

/// Failure while restoring wizard progress from a session payload.
///
/// An empty payload and a corrupt payload are distinct cases; both are
/// recoverable by clearing the session and asking the user to restart.
#[derive(Error, Debug)]
pub enum WizardError {
    /// The session carried no payload at all.
    #[error("wizard payload is empty")]
    EmptyPayload,

    /// The payload bytes did not decode to valid progress.
    #[error("wizard payload decode: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Progress of one user through one wizard.
///
/// Carries a snapshot of the fields so that a definition change mid-flight
/// cannot shift the meaning of the stored index. Invariant:
/// `index <= fields.len()`, with equality meaning completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardProgress {
    /// Caller-chosen tag identifying which flow this progress belongs to
    /// (e.g. a document kind or a role).
    pub tag: String,
    /// Title copied from the definition.
    pub title: String,
    /// Snapshot of the definition's fields at start time.
    pub fields: Vec<Field>,
    /// Index of the field currently being asked.
    pub index: usize,
    /// Collected answers, keyed by field name. Only ever grows.
    pub values: HashMap<String, String>,
}

impl WizardProgress {
    /// Begin a wizard: index at zero, no collected values.
    pub fn start(tag: impl Into<String>, definition: &WizardDefinition) -> Self {
        Self {
            tag: tag.into(),
            title: definition.title.clone(),
            fields: definition.fields.clone(),
            index: 0,
            values: HashMap::new(),
        }
    }

    /// The field currently awaiting an answer, or `None` once completed.
    pub fn current_field(&self) -> Option<&Field> {
        self.fields.get(self.index)
    }

    /// Store `value` under the current field's name and advance.
    ///
    /// No-op when the wizard is already complete. Required-field validation
    /// is the caller's job: an empty answer to a required field must trigger
    /// a reminder prompt instead of ever reaching this method.
    pub fn record_answer(&mut self, value: impl Into<String>) {
        let Some(field) = self.current_field() else {
            return;
        };
        self.values.insert(field.name.clone(), value.into());
        self.index += 1;
    }

    /// Store a serialized attachment list for a file field and advance.
    ///
    /// Same advancement semantics as [`record_answer`](Self::record_answer);
    /// the engine does not interpret the serialized representation.
    pub fn record_file_answer(&mut self, serialized: impl Into<String>) {
        self.record_answer(serialized);
    }

    /// Whether every field has been answered. A zero-field wizard is
    /// completed immediately after [`start`](Self::start).
    pub fn is_completed(&self) -> bool {
        self.index >= self.fields.len()
    }

    /// Total number of steps.
    pub fn steps(&self) -> usize {
        self.fields.len()
    }

    /// Encode progress into the opaque session payload bytes.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Restore progress from session payload bytes.
    pub fn decode(payload: &[u8]) -> Result<Self, WizardError> {
        if payload.is_empty() {
            return Err(WizardError::EmptyPayload);
        }
        Ok(serde_json::from_slice(payload)?)
    }
}
