//! Inbound event model.
//!
//! Every update from the messaging channel is classified into exactly one
//! variant of [`Event`]. The enum is closed: adding a new event kind is a
//! compile-time-checked change everywhere it is matched.

use serde::Deserialize;
use serde_json::Value;

/// A user sent a text message (possibly with attachments).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageEvent {
    /// Author of the message.
    pub user_id: crate::session::UserId,
    /// Dialog the message arrived in. Zero when unknown.
    #[serde(default)]
    pub chat_id: i64,
    /// Display name of the author.
    #[serde(default)]
    pub sender_name: String,
    /// Raw message text.
    #[serde(default)]
    pub text: String,
    /// Raw attachment descriptors, passed through untouched so the backend
    /// can reconstruct the original files.
    #[serde(default)]
    pub attachments: Vec<Value>,
}

impl MessageEvent {
    /// Message text with surrounding whitespace stripped.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Normalized command name, or `None` if the text is not a command.
    pub fn command(&self) -> Option<String> {
        let text = self.text();
        if !text.starts_with('/') {
            return None;
        }
        let first = text.split_whitespace().next()?;
        Some(crate::dispatch::normalize_command(first))
    }

    /// Whitespace-separated arguments following the command.
    pub fn args(&self) -> Vec<&str> {
        self.text().split_whitespace().skip(1).collect()
    }
}

/// A user pressed an inline keyboard button.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CallbackEvent {
    /// Identifier used to answer the callback and release the client's
    /// waiting state.
    pub callback_id: String,
    /// Opaque payload attached to the pressed button.
    #[serde(default)]
    pub payload: String,
    /// User who pressed the button.
    pub user_id: crate::session::UserId,
    /// Dialog the button lives in, when known.
    #[serde(default)]
    pub chat_id: Option<i64>,
    /// Display name of the user.
    #[serde(default)]
    pub sender_name: String,
}

/// A user opened the conversation for the first time (pressed "Start").
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StartedEvent {
    pub user_id: crate::session::UserId,
    #[serde(default)]
    pub chat_id: i64,
    #[serde(default)]
    pub user_name: String,
}

/// A classified inbound update.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// New message in a dialog.
    Message(MessageEvent),
    /// Inline button press.
    Callback(CallbackEvent),
    /// "Conversation started" signal.
    ConversationStarted(StartedEvent),
    /// Anything the core does not handle; logged and dropped.
    Unrecognized {
        /// The wire-level update type, kept for the log line.
        kind: String,
    },
}

impl Event {
    /// Wire-level kind of this event, for logging.
    pub fn kind(&self) -> &str {
        match self {
            Event::Message(_) => "message_created",
            Event::Callback(_) => "message_callback",
            Event::ConversationStarted(_) => "bot_started",
            Event::Unrecognized { kind } => kind,
        }
    }

    /// Parse a raw webhook update into an event.
    ///
    /// Updates are JSON objects tagged by an `update_type` field. Unknown
    /// tags and malformed known tags both become [`Event::Unrecognized`];
    /// a broken single update must never take the dispatcher down.
    pub fn from_update(update: &Value) -> Event {
        let kind = update
            .get("update_type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        let parsed = match kind.as_str() {
            "message_created" => serde_json::from_value(update.clone()).map(Event::Message),
            "message_callback" => serde_json::from_value(update.clone()).map(Event::Callback),
            "bot_started" => {
                serde_json::from_value(update.clone()).map(Event::ConversationStarted)
            }
            _ => return Event::Unrecognized { kind },
        };

        parsed.unwrap_or(Event::Unrecognized { kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_text_and_command() {
        let event = MessageEvent {
            text: "  /Start now please  ".into(),
            ..Default::default()
        };
        assert_eq!(event.text(), "/Start now please");
        assert_eq!(event.command().as_deref(), Some("start"));
        assert_eq!(event.args(), vec!["now", "please"]);
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        let event = MessageEvent {
            text: "hello".into(),
            ..Default::default()
        };
        assert_eq!(event.command(), None);
        assert!(event.args().is_empty());
    }

    #[test]
    fn test_parse_message_update() {
        let update = json!({
            "update_type": "message_created",
            "user_id": 42,
            "chat_id": 7,
            "sender_name": "Tester",
            "text": "hello"
        });

        match Event::from_update(&update) {
            Event::Message(msg) => {
                assert_eq!(msg.user_id, 42);
                assert_eq!(msg.chat_id, 7);
                assert_eq!(msg.text(), "hello");
            }
            other => panic!("expected message event, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_callback_update() {
        let update = json!({
            "update_type": "message_callback",
            "callback_id": "cb-1",
            "payload": "menu:root",
            "user_id": 42
        });

        match Event::from_update(&update) {
            Event::Callback(cb) => {
                assert_eq!(cb.callback_id, "cb-1");
                assert_eq!(cb.payload, "menu:root");
                assert_eq!(cb.chat_id, None);
            }
            other => panic!("expected callback event, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_unknown_update() {
        let update = json!({"update_type": "message_edited", "whatever": 1});
        assert_eq!(
            Event::from_update(&update),
            Event::Unrecognized {
                kind: "message_edited".into()
            }
        );
    }

    #[test]
    fn test_parse_untagged_update() {
        let update = json!({"foo": "bar"});
        match Event::from_update(&update) {
            Event::Unrecognized { kind } => assert_eq!(kind, "unknown"),
            other => panic!("expected unrecognized, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_known_tag_is_unrecognized() {
        // message_created without the mandatory user_id field
        let update = json!({"update_type": "message_created", "text": 3});
        assert!(matches!(
            Event::from_update(&update),
            Event::Unrecognized { .. }
        ));
    }
}
