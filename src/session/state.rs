//! Conversational session state.

use std::collections::HashMap;

/// Where a user currently is inside a multi-turn dialog.
///
/// The `step` selects which session handler intercepts the user's next
/// message. The `payload` is an opaque byte blob owned by whichever flow
/// created the session; the dispatcher never interprets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Name of the active step. An empty step means "no session".
    pub step: String,
    /// Loose key/value parameters attached to the session.
    pub params: HashMap<String, String>,
    /// Opaque payload, typically serialized wizard progress.
    pub payload: Vec<u8>,
}

impl SessionState {
    /// Create a session state at the given step with no parameters.
    pub fn at_step(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            ..Self::default()
        }
    }

    /// Attach a serialized payload.
    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Attach a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Whether this state denotes an active session.
    pub fn is_active(&self) -> bool {
        !self.step.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let state = SessionState::at_step("form:filling")
            .with_param("kind", "study_certificate")
            .with_payload(vec![1, 2, 3]);

        assert_eq!(state.step, "form:filling");
        assert_eq!(state.params.get("kind").map(String::as_str), Some("study_certificate"));
        assert_eq!(state.payload, vec![1, 2, 3]);
        assert!(state.is_active());
    }

    #[test]
    fn test_default_is_inactive() {
        assert!(!SessionState::default().is_active());
    }
}
